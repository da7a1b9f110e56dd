pub mod builtin;
pub mod schema;

use crate::error::TaxtractError;
use crate::model::Field;
use schema::TemplateDefinition;
use std::collections::HashSet;
use std::path::Path;

/// Load a template from a JSON file.
pub fn load_template(path: &Path) -> Result<TemplateDefinition, TaxtractError> {
    let content = std::fs::read_to_string(path).map_err(|e| TaxtractError::TemplateLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_template(&content, path)
}

/// Parse a template from a JSON string.
pub fn parse_template(json: &str, source: &Path) -> Result<TemplateDefinition, TaxtractError> {
    let template: TemplateDefinition =
        serde_json::from_str(json).map_err(|e| TaxtractError::TemplateLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_template(&template)?;
    Ok(template)
}

/// Parse a template from a JSON string (no file path context).
pub fn parse_template_str(json: &str) -> Result<TemplateDefinition, TaxtractError> {
    let template: TemplateDefinition = serde_json::from_str(json).map_err(TaxtractError::Json)?;
    validate_template(&template)?;
    Ok(template)
}

/// Resolve a template by built-in name, or else as a path to a JSON file.
pub fn resolve_template(name_or_path: &str) -> Result<TemplateDefinition, TaxtractError> {
    if builtin::PRESETS.contains(&name_or_path) {
        builtin::load_preset(name_or_path)
    } else {
        load_template(Path::new(name_or_path))
    }
}

/// Validate that a template is well-formed.
pub fn validate_template(template: &TemplateDefinition) -> Result<(), TaxtractError> {
    if template.name.trim().is_empty() {
        return Err(TaxtractError::TemplateInvalid(
            "name must not be empty".into(),
        ));
    }

    if !template.dpi.is_finite() || template.dpi <= 0.0 {
        return Err(TaxtractError::TemplateInvalid(format!(
            "dpi must be positive, got {}",
            template.dpi
        )));
    }

    if template.fields.is_empty() && !template.pattern_fallback {
        return Err(TaxtractError::TemplateInvalid(
            "template defines no regions and no pattern fallback".into(),
        ));
    }

    let mut seen: HashSet<Field> = HashSet::new();
    for region in &template.fields {
        if !seen.insert(region.field) {
            return Err(TaxtractError::TemplateInvalid(format!(
                "field '{}' is defined more than once",
                region.field.key()
            )));
        }

        let coords = [region.x0, region.y0, region.x1, region.y1];
        if coords.iter().any(|c| !c.is_finite() || *c < 0.0) {
            return Err(TaxtractError::TemplateInvalid(format!(
                "field '{}' has negative or non-finite coordinates",
                region.field.key()
            )));
        }

        if region.x0 >= region.x1 || region.y0 >= region.y1 {
            return Err(TaxtractError::TemplateInvalid(format!(
                "field '{}' region is empty: ({}, {}) - ({}, {})",
                region.field.key(),
                region.x0,
                region.y0,
                region.x1,
                region.y1
            )));
        }
    }

    Ok(())
}
