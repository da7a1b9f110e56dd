//! Integration tests for the batch pipeline and its exports.
//!
//! Uses a MockExtractor that returns pre-built page layouts without
//! invoking pdftotext, so these tests run without poppler-utils.

use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};

use calamine::{Data, Reader, Xlsx};
use taxtract_core::batch::{NoProgress, ProgressSink};
use taxtract_core::error::TaxtractError;
use taxtract_core::export::xlsx::SHEET_NAME;
use taxtract_core::extraction::{BBox, PageLayout, PdfExtractor, TextLine, Word};
use taxtract_core::model::Field;
use taxtract_core::templates::builtin::load_preset;
use taxtract_core::{
    extract_pdf, run_batch, BatchOptions, ExportBundle, FailurePolicy, OrderPolicy, UploadedFile,
};

struct MockExtractor {
    pages: HashMap<Vec<u8>, PageLayout>,
    calls: AtomicUsize,
}

impl MockExtractor {
    fn new(pages: Vec<(&str, PageLayout)>) -> Self {
        MockExtractor {
            pages: pages
                .into_iter()
                .map(|(bytes, page)| (bytes.as_bytes().to_vec(), page))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }
}

impl PdfExtractor for MockExtractor {
    fn first_page(&self, pdf_bytes: &[u8]) -> Result<PageLayout, TaxtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if pdf_bytes == b"%PDF-no-pages" {
            return Err(TaxtractError::NoPages);
        }
        self.pages
            .get(pdf_bytes)
            .cloned()
            .ok_or_else(|| TaxtractError::Extraction("not a PDF".into()))
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// US Letter page. At 200 dpi the raster is 1700 x 2200, so one raster
/// pixel is 0.36 pt on both axes.
fn letter_page(lines: Vec<(usize, Vec<(&str, f64, f64)>)>) -> PageLayout {
    PageLayout {
        width: 612.0,
        height: 792.0,
        lines: lines
            .into_iter()
            .map(|(block, words)| TextLine {
                block,
                words: words
                    .into_iter()
                    .map(|(text, x, y)| Word {
                        text: text.to_string(),
                        bbox: BBox::new(x, y, x + 5.0 * text.len() as f64, y + 9.0),
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// A layout-1 slip. The id region (150,320)-(550,360) px maps to
/// (54, 115.2)-(198, 129.6) pt; the tax base region (900,850)-(1100,900)
/// maps to (324, 306)-(396, 324).
fn v1_slip(id: &str, tax_base: &str) -> PageLayout {
    let mut lines = vec![(0, vec![("BUKTI", 54.0, 60.0), ("POTONG", 90.0, 60.0)])];
    if !id.is_empty() {
        lines.push((1, vec![(id, 60.0, 118.0)]));
    }
    lines.push((2, vec![(tax_base, 326.0, 310.0)]));
    letter_page(lines)
}

fn cell(data: Option<&Data>) -> String {
    match data {
        Some(Data::String(s)) => s.clone(),
        Some(Data::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn archive_entries(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            entry.read_to_end(&mut content).unwrap();
            (entry.name().to_string(), content)
        })
        .collect()
}

#[derive(Default)]
struct RecordingProgress {
    fractions: Vec<f64>,
    statuses: Vec<String>,
    finished: Option<usize>,
}

impl ProgressSink for RecordingProgress {
    fn advanced(&mut self, done: usize, total: usize, _file_name: &str) {
        self.fractions
            .push(taxtract_core::batch::progress_fraction(done, total));
        self.statuses.push(format!("Processing: {done}/{total}"));
    }

    fn finished(&mut self, total: usize) {
        self.finished = Some(total);
    }
}

// ---------------------------------------------------------------------------
// Test 1: Three slips, two with ids and one without
// ---------------------------------------------------------------------------
#[test]
fn three_file_batch_exports_renamed_archive() {
    let template = load_preset("v1").unwrap();
    let extractor = MockExtractor::new(vec![
        ("%PDF-one", v1_slip("100", "1.000.000")),
        ("%PDF-two", v1_slip("200", "2.500.000")),
        ("%PDF-three", v1_slip("", "300.000")),
    ]);
    let files = vec![
        UploadedFile::new("doc1.pdf", b"%PDF-one".to_vec()),
        UploadedFile::new("doc2.pdf", b"%PDF-two".to_vec()),
        UploadedFile::new("doc3.pdf", b"%PDF-three".to_vec()),
    ];

    let mut progress = RecordingProgress::default();
    let batch = run_batch(
        &files,
        &extractor,
        &template,
        &BatchOptions::default(),
        &mut progress,
    )
    .unwrap();

    // Processing order is the reverse of upload order.
    let names: Vec<&str> = batch.records.iter().map(|r| r.file_name.as_str()).collect();
    assert_eq!(names, vec!["doc3.pdf", "doc2.pdf", "doc1.pdf"]);
    assert_eq!(batch.records[0].id(), None);
    assert_eq!(batch.records[1].id(), Some("200"));
    assert_eq!(batch.records[2].fields.get(Field::TaxBase), Some("1.000.000"));

    assert_eq!(progress.fractions.len(), 3);
    assert!(progress.fractions.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(progress.fractions.last(), Some(&1.0));
    assert_eq!(progress.statuses[0], "Processing: 1/3");
    assert_eq!(progress.finished, Some(3));

    let bundle = ExportBundle::build(&batch, &files).unwrap().unwrap();
    assert_eq!(bundle.spreadsheet.file_name, "Extracted File.xlsx");
    assert_eq!(bundle.archive.file_name, "Renamed_PDFs.zip");
    assert_eq!(bundle.archive.mime_type, "application/zip");

    let mut entries = archive_entries(&bundle.archive.bytes);
    entries.sort();
    assert_eq!(
        entries,
        vec![
            ("100.pdf".to_string(), b"%PDF-one".to_vec()),
            ("200.pdf".to_string(), b"%PDF-two".to_vec()),
            ("doc3.pdf".to_string(), b"%PDF-three".to_vec()),
        ]
    );

    let mut workbook: Xlsx<_> =
        calamine::open_workbook_from_rs(Cursor::new(bundle.spreadsheet.bytes)).unwrap();
    let range = workbook.worksheet_range(SHEET_NAME).unwrap();
    assert_eq!(range.height(), 4);
    assert_eq!(cell(range.get_value((0, 1))), "ID");
    assert_eq!(cell(range.get_value((1, 0))), "doc3.pdf");
    assert_eq!(cell(range.get_value((1, 1))), "");
    assert_eq!(cell(range.get_value((2, 0))), "doc2.pdf");
    assert_eq!(cell(range.get_value((2, 1))), "200");
    assert_eq!(cell(range.get_value((3, 0))), "doc1.pdf");
    assert_eq!(cell(range.get_value((3, 3))), "1.000.000");
}

// ---------------------------------------------------------------------------
// Test 2: An empty upload processes nothing and exports nothing
// ---------------------------------------------------------------------------
#[test]
fn empty_batch_has_no_exports() {
    let template = load_preset("v2").unwrap();
    let extractor = MockExtractor::new(vec![]);
    let mut progress = RecordingProgress::default();

    let batch = run_batch(
        &[],
        &extractor,
        &template,
        &BatchOptions::default(),
        &mut progress,
    )
    .unwrap();

    assert!(batch.is_empty());
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    assert!(progress.fractions.is_empty());
    assert_eq!(progress.finished, None);
    assert!(ExportBundle::build(&batch, &[]).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Test 3: Layout 2 takes document number and payer from the page text
// ---------------------------------------------------------------------------
#[test]
fn v2_fallback_supplies_document_number_and_payer() {
    let template = load_preset("v2").unwrap();
    let page = letter_page(vec![
        (0, vec![("BUKTI", 54.0, 60.0), ("POTONG", 90.0, 60.0)]),
        (
            1,
            vec![("C.3", 30.0, 400.0), ("NAMA", 50.0, 400.0), ("PEMOTONG", 80.0, 400.0)],
        ),
        (1, vec![("DAN/ATAU", 30.0, 412.0), ("PEMUNGUT", 80.0, 412.0)]),
        (1, vec![("PPh", 30.0, 424.0), (":", 50.0, 424.0)]),
        (
            1,
            vec![("PT", 30.0, 436.0), ("SUMBER", 45.0, 436.0), ("REJEKI", 85.0, 436.0)],
        ),
        (1, vec![("ABADI", 30.0, 448.0)]),
        (
            2,
            vec![
                ("Nomor", 30.0, 500.0),
                ("Dokumen", 65.0, 500.0),
                (":", 105.0, 500.0),
                ("INV/2024/77", 112.0, 500.0),
            ],
        ),
    ]);
    let extractor = MockExtractor::new(vec![("%PDF-v2", page)]);

    let values = extract_pdf(b"%PDF-v2", &extractor, &template).unwrap();
    assert_eq!(values.get(Field::PayerName), Some("PT SUMBER REJEKI ABADI"));
    assert_eq!(values.get(Field::DocumentNumber), Some("INV/2024/77"));
    // No text in the id region, so the document number stands in.
    assert_eq!(values.get(Field::Id), Some("INV/2024/77"));

    let files = vec![UploadedFile::new("slip.pdf", b"%PDF-v2".to_vec())];
    let batch = run_batch(
        &files,
        &extractor,
        &template,
        &BatchOptions::default(),
        &mut NoProgress,
    )
    .unwrap();
    let bundle = ExportBundle::build(&batch, &files).unwrap().unwrap();
    let entries = archive_entries(&bundle.archive.bytes);
    assert_eq!(entries[0].0, "INV-2024-77.pdf");
}

// ---------------------------------------------------------------------------
// Test 4: Failure policies
// ---------------------------------------------------------------------------
#[test]
fn malformed_file_aborts_by_default() {
    let template = load_preset("v1").unwrap();
    let extractor = MockExtractor::new(vec![("%PDF-one", v1_slip("100", "1"))]);
    let files = vec![
        UploadedFile::new("doc1.pdf", b"%PDF-one".to_vec()),
        UploadedFile::new("broken.pdf", b"garbage".to_vec()),
    ];

    let result = run_batch(
        &files,
        &extractor,
        &template,
        &BatchOptions::default(),
        &mut NoProgress,
    );
    assert!(matches!(result, Err(TaxtractError::Extraction(_))));
}

#[test]
fn failures_can_be_recorded_per_file() {
    let template = load_preset("v1").unwrap();
    let extractor = MockExtractor::new(vec![("%PDF-one", v1_slip("100", "1"))]);
    let files = vec![
        UploadedFile::new("doc1.pdf", b"%PDF-one".to_vec()),
        UploadedFile::new("empty.pdf", b"%PDF-no-pages".to_vec()),
    ];
    let options = BatchOptions {
        order: OrderPolicy::AsUploaded,
        on_failure: FailurePolicy::Record,
    };

    let batch = run_batch(&files, &extractor, &template, &options, &mut NoProgress).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.records[0].id(), Some("100"));
    assert!(!batch.records[0].is_failed());
    assert_eq!(batch.records[1].file_name, "empty.pdf");
    assert_eq!(
        batch.records[1].error.as_deref(),
        Some("document has no pages")
    );
    assert_eq!(batch.failed().count(), 1);

    let bundle = ExportBundle::build(&batch, &files).unwrap().unwrap();
    let names: Vec<String> = archive_entries(&bundle.archive.bytes)
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["100.pdf", "empty.pdf"]);
}

// ---------------------------------------------------------------------------
// Test 5: Assembly is repeatable across a batch run
// ---------------------------------------------------------------------------
#[test]
fn repeated_runs_give_identical_batches() {
    let template = load_preset("v1").unwrap();
    let extractor = MockExtractor::new(vec![("%PDF-one", v1_slip("100", "1.000"))]);
    let files = vec![UploadedFile::new("doc1.pdf", b"%PDF-one".to_vec())];
    let options = BatchOptions::default();

    let first = run_batch(&files, &extractor, &template, &options, &mut NoProgress).unwrap();
    let second = run_batch(&files, &extractor, &template, &options, &mut NoProgress).unwrap();
    assert_eq!(first, second);
}
