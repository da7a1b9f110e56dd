use std::path::{Path, PathBuf};

use taxtract_core::batch::{progress_fraction, ProgressSink};
use taxtract_core::error::TaxtractError;
use taxtract_core::export::{Artifact, ExportBundle};
use taxtract_core::extraction::pdftotext::PdftotextExtractor;
use taxtract_core::templates::resolve_template;
use taxtract_core::{run_batch, BatchOptions, FailurePolicy, OrderPolicy, UploadedFile};

use crate::output;

pub struct ExtractArgs {
    pub files: Vec<PathBuf>,
    pub template: String,
    pub out_dir: PathBuf,
    pub output_format: String,
    pub keep_order: bool,
    pub continue_on_error: bool,
    pub write_archive: bool,
}

/// Prints "Processing: N/total" to stderr after each file.
struct StderrProgress;

impl ProgressSink for StderrProgress {
    fn advanced(&mut self, done: usize, total: usize, file_name: &str) {
        eprintln!(
            "Processing: {done}/{total} ({:.0}%) {file_name}",
            progress_fraction(done, total) * 100.0
        );
    }

    fn finished(&mut self, total: usize) {
        eprintln!("Successfully processed {total} files");
    }
}

pub fn run(args: ExtractArgs) -> Result<(), TaxtractError> {
    let template = resolve_template(&args.template)?;

    let files = args
        .files
        .iter()
        .map(|path| read_upload(path))
        .collect::<Result<Vec<_>, _>>()?;

    let options = BatchOptions {
        order: if args.keep_order {
            OrderPolicy::AsUploaded
        } else {
            OrderPolicy::NewestFirst
        },
        on_failure: if args.continue_on_error {
            FailurePolicy::Record
        } else {
            FailurePolicy::Abort
        },
    };

    let extractor = PdftotextExtractor::new();
    if !PdftotextExtractor::is_available() {
        tracing::warn!("pdftotext does not appear to be installed");
    }
    tracing::debug!(
        template = %template.name,
        files = files.len(),
        out_dir = %args.out_dir.display(),
        "starting extraction"
    );
    let batch = run_batch(&files, &extractor, &template, &options, &mut StderrProgress)?;

    match args.output_format.as_str() {
        "json" => output::json::print(&batch)?,
        _ => output::table::print(&batch),
    }

    let Some(bundle) = ExportBundle::build(&batch, &files)? else {
        return Ok(());
    };

    std::fs::create_dir_all(&args.out_dir)?;
    write_artifact(&args.out_dir, &bundle.spreadsheet)?;
    if args.write_archive {
        write_artifact(&args.out_dir, &bundle.archive)?;
    }

    let failed = batch.failed().count();
    if failed > 0 {
        eprintln!("  {failed} file(s) could not be processed");
    }

    Ok(())
}

fn read_upload(path: &Path) -> Result<UploadedFile, TaxtractError> {
    let bytes = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(UploadedFile::new(name, bytes))
}

fn write_artifact(dir: &Path, artifact: &Artifact) -> Result<(), TaxtractError> {
    let path = dir.join(artifact.file_name);
    std::fs::write(&path, &artifact.bytes)?;
    eprintln!(
        "Wrote {} ({}, {} bytes)",
        path.display(),
        artifact.mime_type,
        artifact.bytes.len()
    );
    Ok(())
}
