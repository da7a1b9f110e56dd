pub mod assemble;
pub mod batch;
pub mod error;
pub mod export;
pub mod extraction;
pub mod fallback;
pub mod geometry;
pub mod model;
pub mod templates;

use error::TaxtractError;
use extraction::PdfExtractor;
use model::FieldValues;
use templates::schema::TemplateDefinition;

pub use batch::{run_batch, BatchOptions, FailurePolicy, OrderPolicy, UploadedFile};
pub use export::ExportBundle;

/// Main API entry point: read the fields of one PDF with a template.
///
/// Only the first page is consulted.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    template: &TemplateDefinition,
) -> Result<FieldValues, TaxtractError> {
    let page = extractor.first_page(pdf_bytes)?;
    assemble::assemble(&page, template)
}
