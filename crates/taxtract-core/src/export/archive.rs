use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::batch::UploadedFile;
use crate::error::TaxtractError;
use crate::model::{Batch, ExtractedRecord};

/// Original file bytes under the name they get in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenamedCopy<'a> {
    pub new_name: String,
    pub bytes: &'a [u8],
}

/// Archive entry name for a record: `{id}.pdf`, or the original name when
/// no identifier was extracted.
///
/// Whitespace runs (including the newline of a two-line id) collapse to one
/// space. Path separators and other control characters become `-`.
pub fn entry_name(record: &ExtractedRecord) -> String {
    match record.id() {
        Some(id) => format!("{}.pdf", sanitize_id(id)),
        None => record.file_name.clone(),
    }
}

fn sanitize_id(id: &str) -> String {
    id.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .map(|c| match c {
            '/' | '\\' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect()
}

/// Pair every record with its source bytes, renaming and disambiguating.
///
/// A name that is already taken gets a counter suffix before its extension:
/// `100.pdf`, `100_2.pdf`, `100_3.pdf`.
pub fn renamed_copies<'a>(
    batch: &Batch,
    files: &'a [UploadedFile],
) -> Result<Vec<RenamedCopy<'a>>, TaxtractError> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut copies = Vec::with_capacity(batch.len());

    for record in &batch.records {
        let source = files.get(record.source_index).ok_or_else(|| {
            TaxtractError::Export(format!(
                "no source file for record '{}' (index {})",
                record.file_name, record.source_index
            ))
        })?;

        let base = entry_name(record);
        let mut new_name = base.clone();
        let mut counter = 1;
        while taken.contains(&new_name) {
            counter += 1;
            new_name = with_suffix(&base, counter);
        }
        if new_name != base {
            tracing::warn!(name = %base, renamed = %new_name, "duplicate archive name");
        }
        taken.insert(new_name.clone());

        copies.push(RenamedCopy {
            new_name,
            bytes: &source.bytes,
        });
    }

    Ok(copies)
}

/// Zip the copies, each as a deflated entry with unmodified content.
pub fn write_archive(copies: &[RenamedCopy<'_>]) -> Result<Vec<u8>, TaxtractError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for copy in copies {
        zip.start_file(copy.new_name.as_str(), options)?;
        zip.write_all(copy.bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}

fn with_suffix(name: &str, counter: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}_{}{}", &name[..dot], counter, &name[dot..]),
        _ => format!("{name}_{counter}"),
    }
}
