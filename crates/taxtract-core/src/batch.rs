use crate::error::TaxtractError;
use crate::extraction::PdfExtractor;
use crate::model::{Batch, ExtractedRecord, FieldValues};
use crate::templates::schema::TemplateDefinition;

/// A file handed to the batch, with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        UploadedFile {
            name: name.into(),
            bytes,
        }
    }
}

/// Order in which delivered files are processed and listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderPolicy {
    /// Most recently delivered first, matching an upload list that shows
    /// the newest file on top.
    #[default]
    NewestFirst,
    AsUploaded,
}

/// What a failing file does to the rest of the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The first failure aborts the run.
    #[default]
    Abort,
    /// The failure is kept on the file's record and the run continues.
    Record,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    pub order: OrderPolicy,
    pub on_failure: FailurePolicy,
}

/// Observer of batch progress.
pub trait ProgressSink {
    fn started(&mut self, _total: usize) {}

    /// Called after each file; `done / total` never decreases.
    fn advanced(&mut self, _done: usize, _total: usize, _file_name: &str) {}

    fn finished(&mut self, _total: usize) {}
}

/// Progress sink that ignores every update.
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Fraction of the batch completed, in `[0, 1]`.
pub fn progress_fraction(done: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        (done.min(total)) as f64 / total as f64
    }
}

/// Indices of `count` delivered files, in processing order.
pub fn processing_order(count: usize, order: OrderPolicy) -> Vec<usize> {
    match order {
        OrderPolicy::NewestFirst => (0..count).rev().collect(),
        OrderPolicy::AsUploaded => (0..count).collect(),
    }
}

/// Extract one record from a single file.
pub fn extract_file(
    file: &UploadedFile,
    extractor: &dyn PdfExtractor,
    template: &TemplateDefinition,
) -> Result<ExtractedRecord, TaxtractError> {
    let fields = crate::extract_pdf(&file.bytes, extractor, template)?;
    Ok(ExtractedRecord {
        file_name: file.name.clone(),
        fields,
        error: None,
        source_index: 0,
    })
}

/// Process every file in order and collect one record per file.
///
/// Nothing is extracted for an empty input. With [`FailurePolicy::Abort`]
/// the first failing file's error is returned.
pub fn run_batch(
    files: &[UploadedFile],
    extractor: &dyn PdfExtractor,
    template: &TemplateDefinition,
    options: &BatchOptions,
    progress: &mut dyn ProgressSink,
) -> Result<Batch, TaxtractError> {
    let mut batch = Batch::default();
    if files.is_empty() {
        return Ok(batch);
    }

    let total = files.len();
    tracing::info!(
        total,
        template = %template.name,
        backend = extractor.backend_name(),
        "processing batch"
    );
    progress.started(total);

    for (done, index) in processing_order(total, options.order).into_iter().enumerate() {
        let file = &files[index];
        let mut record = match extract_file(file, extractor, template) {
            Ok(record) => record,
            Err(e) => match options.on_failure {
                FailurePolicy::Abort => {
                    tracing::error!(file = %file.name, error = %e, "aborting batch");
                    return Err(e);
                }
                FailurePolicy::Record => {
                    tracing::warn!(file = %file.name, error = %e, "file failed, continuing");
                    ExtractedRecord {
                        file_name: file.name.clone(),
                        fields: FieldValues::default(),
                        error: Some(e.to_string()),
                        source_index: 0,
                    }
                }
            },
        };

        record.source_index = index;
        tracing::info!(file = %file.name, id = record.id().unwrap_or(""), "file processed");
        batch.records.push(record);
        progress.advanced(done + 1, total, &file.name);
    }

    progress.finished(total);
    Ok(batch)
}
