pub mod pdftotext;

use crate::error::TaxtractError;
use crate::geometry::PageGeometry;

/// Slack, in points, allowed when deciding whether a glyph lies inside a region.
const CONTAINMENT_TOLERANCE: f64 = 0.5;

/// Axis-aligned rectangle in PDF point space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl BBox {
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        BBox {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// True when `inner` lies within this box, allowing `tolerance` on every edge.
    pub fn contains(&self, inner: &BBox, tolerance: f64) -> bool {
        inner.x_min >= self.x_min - tolerance
            && inner.y_min >= self.y_min - tolerance
            && inner.x_max <= self.x_max + tolerance
            && inner.y_max <= self.y_max + tolerance
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub bbox: BBox,
}

impl Word {
    /// Characters of this word whose boxes lie inside `rect`.
    ///
    /// The text layer only carries word boxes, so each character gets an
    /// equal share of the word's width.
    pub fn clip_to(&self, rect: &BBox) -> Option<String> {
        if rect.contains(&self.bbox, CONTAINMENT_TOLERANCE) {
            return Some(self.text.clone());
        }

        let chars: Vec<char> = self.text.chars().collect();
        if chars.is_empty() {
            return None;
        }
        let step = (self.bbox.x_max - self.bbox.x_min) / chars.len() as f64;

        let kept: String = chars
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                let x_min = self.bbox.x_min + step * *i as f64;
                let glyph = BBox::new(x_min, self.bbox.y_min, x_min + step, self.bbox.y_max);
                rect.contains(&glyph, CONTAINMENT_TOLERANCE)
            })
            .map(|(_, c)| *c)
            .collect();

        if kept.trim().is_empty() {
            None
        } else {
            Some(kept)
        }
    }
}

/// One line of the text layer, words in reading order.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Index of the text block the line belongs to.
    pub block: usize,
    pub words: Vec<Word>,
}

/// Text layer and size of the first page of a PDF.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    pub lines: Vec<TextLine>,
}

impl PageLayout {
    /// Geometry pairing this page's size with a raster rendered at `dpi`.
    pub fn geometry(&self, dpi: f64) -> Result<PageGeometry, TaxtractError> {
        PageGeometry::for_page(self.width, self.height, dpi)
    }

    /// Text of all glyphs inside `rect`, trimmed.
    ///
    /// Words crossing an edge of the rectangle are clipped to the characters
    /// that lie inside it. Words of a line are joined by single spaces and
    /// lines by newlines, keeping the order of the text layer. Returns an
    /// empty string when the rectangle encloses no text.
    pub fn text_within(&self, rect: &BBox) -> String {
        let lines: Vec<String> = self
            .lines
            .iter()
            .filter_map(|line| {
                let words: Vec<String> = line
                    .words
                    .iter()
                    .filter_map(|w| w.clip_to(rect))
                    .collect();
                if words.is_empty() {
                    None
                } else {
                    Some(words.join(" "))
                }
            })
            .collect();

        lines.join("\n").trim().to_string()
    }

    /// Plain text of the whole page, one line per text line.
    ///
    /// Block boundaries add no blank line, so text wrapped across blocks
    /// reads as consecutive lines.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let text: Vec<&str> = line.words.iter().map(|w| w.text.as_str()).collect();
            out.push_str(&text.join(" "));
            out.push('\n');
        }
        out
    }
}

/// Trait for PDF text-layer backends.
pub trait PdfExtractor: Send + Sync {
    /// Open the document and return the layout of its first page.
    ///
    /// A document without pages is [`TaxtractError::NoPages`].
    fn first_page(&self, pdf_bytes: &[u8]) -> Result<PageLayout, TaxtractError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
