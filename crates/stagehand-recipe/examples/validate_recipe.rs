use std::env;
use std::path::{Path, PathBuf};

use serde_json::Value;
use stagehand_model::ContentModel;
use stagehand_recipe::{ValidationReport, recipe_json_schema, validate_recipe};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let mut recipe_path: Option<PathBuf> = None;
    let mut model_path: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--model" => {
                model_path = args.next().map(PathBuf::from);
            }
            _ => {
                if recipe_path.is_none() {
                    recipe_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let recipe_path = recipe_path.ok_or("missing recipe path")?;
    let model_path = model_path.ok_or("missing --model path")?;

    let recipe_json = load_json(&recipe_path)?;
    let model_json = load_json(&model_path)?;
    let model: ContentModel = serde_json::from_value(model_json)?;
    let recipe_schema = serde_json::to_value(recipe_json_schema())?;

    // Without a sampler registry the unknown-sampler check is skipped.
    let validated = match validate_recipe(&recipe_json, &recipe_schema, &model, &[]) {
        Ok(validated) => validated,
        Err(report) => {
            eprintln!("recipe validation failed");
            print_report(&report);
            std::process::exit(1);
        }
    };

    if !validated.warnings.is_empty() {
        eprintln!("recipe validated with warnings:");
        print_report(&ValidationReport {
            errors: Vec::new(),
            warnings: validated.warnings,
        });
    } else {
        println!("recipe validated successfully");
    }

    Ok(())
}

fn load_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    let json = serde_json::from_str(&contents)?;
    Ok(json)
}

fn print_report(report: &ValidationReport) {
    for issue in &report.errors {
        eprintln!("error {} {}: {}", issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
    for issue in &report.warnings {
        eprintln!("warning {} {}: {}", issue.code, issue.path, issue.message);
        if let Some(hint) = &issue.hint {
            eprintln!("  hint: {hint}");
        }
    }
}
