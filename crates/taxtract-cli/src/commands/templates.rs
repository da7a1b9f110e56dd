use std::path::Path;
use taxtract_core::error::TaxtractError;
use taxtract_core::model::Field;
use taxtract_core::templates::builtin;
use taxtract_core::templates::schema::TemplateDefinition;

pub fn list() -> Result<(), TaxtractError> {
    println!("Available templates:\n");
    for name in builtin::PRESETS {
        let template = builtin::load_preset(name)?;
        let marker = if *name == builtin::DEFAULT_PRESET {
            " [default]"
        } else {
            ""
        };
        println!("  {:<4} {} (v{}){}", name, template.name, template.version, marker);
        if let Some(ref desc) = template.description {
            println!("       {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(name_or_path: &str) -> Result<(), TaxtractError> {
    let template = taxtract_core::templates::resolve_template(name_or_path)?;
    print_template(&template);
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), TaxtractError> {
    let template = taxtract_core::templates::load_template(file)?;

    println!(
        "Template '{}' (v{}) is valid.",
        template.name, template.version
    );
    println!("  Regions: {}", template.fields.len());

    // Fields nothing will fill (warnings, not errors)
    let missing: Vec<String> = Field::ALL
        .iter()
        .filter(|f| template.region(**f).is_none())
        .filter(|f| {
            !(template.pattern_fallback
                && matches!(f, Field::DocumentNumber | Field::PayerName))
        })
        .map(|f| f.key().to_string())
        .collect();

    if !missing.is_empty() {
        println!("\nWarnings:");
        for key in &missing {
            println!("  - field '{}' has no region and will always be empty", key);
        }
    }

    Ok(())
}

fn print_template(template: &TemplateDefinition) {
    println!("{} (version {})\n", template.name, template.version);

    if let Some(ref desc) = template.description {
        println!("{}\n", desc);
    }

    println!("Regions are in pixels of a {} dpi raster of page 1.\n", template.dpi);

    println!(
        "  {:<16}  {:>6}  {:>6}  {:>6}  {:>6}",
        "Field", "x0", "y0", "x1", "y1"
    );
    println!("  {}", "-".repeat(16 + 4 * 8));
    for region in &template.fields {
        println!(
            "  {:<16}  {:>6}  {:>6}  {:>6}  {:>6}",
            region.field.key(),
            region.x0,
            region.y0,
            region.x1,
            region.y1
        );
    }

    if template.pattern_fallback {
        println!();
        println!("Pattern fallback: document number and payer name are searched in the");
        println!("page text; the document number is used as ID when the ID region is empty.");
    }
    println!();
}
