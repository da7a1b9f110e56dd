use crate::error::TaxtractError;
use crate::extraction::PageLayout;
use crate::fallback::{find_document_number, find_payer_name};
use crate::geometry::map_region;
use crate::model::{Field, FieldValues};
use crate::templates::schema::TemplateDefinition;

/// Read every field of `template` from the first page of a document.
///
/// Region text is taken as-is (trimmed, no numeric parsing). Templates with
/// `pattern_fallback` also search the full page text for the document number
/// and payer name; a non-empty region value for those fields wins, and the
/// document number stands in for an empty identifier.
pub fn assemble(
    page: &PageLayout,
    template: &TemplateDefinition,
) -> Result<FieldValues, TaxtractError> {
    let geometry = page.geometry(template.dpi)?;
    let mut values = FieldValues::default();

    for region in &template.fields {
        let rect = map_region(region, &geometry);
        let text = page.text_within(&rect);
        tracing::debug!(field = region.field.key(), ?rect, %text, "region extracted");
        values.set(region.field, text);
    }

    if template.pattern_fallback {
        let full_text = page.full_text();

        if values.get(Field::DocumentNumber).is_none() {
            values.set(Field::DocumentNumber, find_document_number(&full_text));
        }
        if values.get(Field::PayerName).is_none() {
            values.set(Field::PayerName, find_payer_name(&full_text));
        }
        if values.get(Field::Id).is_none() {
            if let Some(number) = values.document_number.clone() {
                tracing::debug!(%number, "identifier taken from document number");
                values.id = Some(number);
            }
        }
    }

    Ok(values)
}
