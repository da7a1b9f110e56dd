use serde::{Deserialize, Serialize};

use crate::model::Field;

/// A document layout: where each field sits on a raster of the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub version: String,
    /// Resolution of the raster the region coordinates were measured on.
    pub dpi: f64,
    /// Search the full page text for the document number and payer name.
    #[serde(default)]
    pub pattern_fallback: bool,
    pub fields: Vec<FieldRegion>,
}

impl TemplateDefinition {
    pub fn region(&self, field: Field) -> Option<&FieldRegion> {
        self.fields.iter().find(|r| r.field == field)
    }
}

/// Rectangle of one field, in raster pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldRegion {
    pub field: Field,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}
