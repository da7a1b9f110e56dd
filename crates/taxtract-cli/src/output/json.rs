use taxtract_core::error::TaxtractError;
use taxtract_core::model::Batch;

pub fn print(batch: &Batch) -> Result<(), TaxtractError> {
    let json = serde_json::to_string_pretty(batch)?;
    println!("{json}");
    Ok(())
}
