use crate::error::TaxtractError;
use crate::templates::schema::TemplateDefinition;

const BUKTI_POTONG_V1_JSON: &str = include_str!("../../../../templates/bukti-potong-v1.json");
const BUKTI_POTONG_V2_JSON: &str = include_str!("../../../../templates/bukti-potong-v2.json");

/// Available predefined templates.
pub const PRESETS: &[&str] = &["v1", "v2"];

/// Template used when none is chosen.
pub const DEFAULT_PRESET: &str = "v2";

/// Load a predefined template by name.
pub fn load_preset(name: &str) -> Result<TemplateDefinition, TaxtractError> {
    let json = match name {
        "v1" => BUKTI_POTONG_V1_JSON,
        "v2" => BUKTI_POTONG_V2_JSON,
        _ => {
            return Err(TaxtractError::TemplateInvalid(format!(
                "unknown template '{}'. Available: {}",
                name,
                PRESETS.join(", ")
            )))
        }
    };
    let template: TemplateDefinition = serde_json::from_str(json)?;
    Ok(template)
}
