use crate::error::TaxtractError;
use crate::extraction::{BBox, PageLayout, PdfExtractor, TextLine, Word};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::Write;
use std::process::Command;

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -bbox-layout` on the first page, which reports the page
/// size and every word with its bounding box in points.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn first_page(&self, pdf_bytes: &[u8]) -> Result<PageLayout, TaxtractError> {
        // Write PDF bytes to a temp file
        let mut tmpfile = tempfile::NamedTempFile::new()
            .map_err(|e| TaxtractError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| TaxtractError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .args(["-f", "1", "-l", "1", "-bbox-layout"])
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TaxtractError::PdftotextNotFound
                } else {
                    TaxtractError::Extraction(format!("pdftotext -bbox-layout failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(TaxtractError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        parse_bbox_xml(&xml)
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Parse `pdftotext -bbox-layout` output into the layout of its first page.
fn parse_bbox_xml(xml: &str) -> Result<PageLayout, TaxtractError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page: Option<PageLayout> = None;
    let mut block_index: Option<usize> = None;
    let mut current_line: Option<TextLine> = None;
    let mut current_word: Option<(BBox, String)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"page" => {
                    if page.is_some() {
                        break;
                    }
                    page = Some(PageLayout {
                        width: attr_f64(&e, "width").unwrap_or(0.0),
                        height: attr_f64(&e, "height").unwrap_or(0.0),
                        lines: Vec::new(),
                    });
                }
                b"block" => {
                    block_index = Some(block_index.map_or(0, |b| b + 1));
                }
                b"line" => {
                    current_line = Some(TextLine {
                        block: block_index.unwrap_or(0),
                        words: Vec::new(),
                    });
                }
                b"word" => {
                    current_word = parse_bbox(&e).map(|bbox| (bbox, String::new()));
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some((_, text)) = current_word.as_mut() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"word" => {
                    if let (Some((bbox, text)), Some(line)) =
                        (current_word.take(), current_line.as_mut())
                    {
                        let text = text.trim();
                        if !text.is_empty() {
                            line.words.push(Word {
                                text: text.to_string(),
                                bbox,
                            });
                        }
                    }
                }
                b"line" => {
                    if let (Some(line), Some(page)) = (current_line.take(), page.as_mut()) {
                        if !line.words.is_empty() {
                            page.lines.push(line);
                        }
                    }
                }
                b"page" => break,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    page.ok_or(TaxtractError::NoPages)
}

fn attr_f64(tag: &BytesStart, name: &str) -> Option<f64> {
    let attr = tag.try_get_attribute(name).ok()??;
    attr.unescape_value().ok()?.parse().ok()
}

fn parse_bbox(word_tag: &BytesStart) -> Option<BBox> {
    Some(BBox {
        x_min: attr_f64(word_tag, "xMin")?,
        y_min: attr_f64(word_tag, "yMin")?,
        x_max: attr_f64(word_tag, "xMax")?,
        y_max: attr_f64(word_tag, "yMax")?,
    })
}
