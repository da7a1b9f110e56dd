pub mod archive;
pub mod xlsx;

use crate::batch::UploadedFile;
use crate::error::TaxtractError;
use crate::model::Batch;

pub const SPREADSHEET_FILE_NAME: &str = "Extracted File.xlsx";
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub const ARCHIVE_FILE_NAME: &str = "Renamed_PDFs.zip";
pub const ARCHIVE_MIME: &str = "application/zip";

/// A downloadable file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Both outputs of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub spreadsheet: Artifact,
    pub archive: Artifact,
}

impl ExportBundle {
    /// Serialize a finished batch. Returns `None` for an empty batch.
    ///
    /// `files` are the delivered files, in delivery order.
    pub fn build(batch: &Batch, files: &[UploadedFile]) -> Result<Option<Self>, TaxtractError> {
        if batch.is_empty() {
            return Ok(None);
        }

        let spreadsheet = Artifact {
            file_name: SPREADSHEET_FILE_NAME,
            mime_type: SPREADSHEET_MIME,
            bytes: xlsx::write_workbook(batch)?,
        };

        let copies = archive::renamed_copies(batch, files)?;
        let archive = Artifact {
            file_name: ARCHIVE_FILE_NAME,
            mime_type: ARCHIVE_MIME,
            bytes: archive::write_archive(&copies)?,
        };

        tracing::info!(
            records = batch.len(),
            spreadsheet_bytes = spreadsheet.bytes.len(),
            archive_bytes = archive.bytes.len(),
            "export ready"
        );

        Ok(Some(ExportBundle {
            spreadsheet,
            archive,
        }))
    }
}
