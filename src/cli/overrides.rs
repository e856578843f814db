use crate::models::Article;
use crate::store::{articles, DocumentStore, OverrideFormat};
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run_add(path: &Path, field: &str, format: &str) -> Result<()> {
    articles::ensure_not_legacy(path)?;

    let format = match format {
        "json" => OverrideFormat::Json,
        _ => OverrideFormat::Markdown,
    };

    let store = DocumentStore::<Article>::new(path);
    match store.create_override(field, format)? {
        Some(sidecar) => {
            println!(
                "{}",
                format!("✅ Exported '{}' to {}", field, sidecar.display()).green()
            );
        }
        None => {
            println!(
                "{}",
                format!("Field '{}' is not present in the document.", field).yellow()
            );
        }
    }

    Ok(())
}

pub fn run_remove(path: &Path, field: &str) -> Result<()> {
    articles::ensure_not_legacy(path)?;

    let store = DocumentStore::<Article>::new(path);
    if store.remove_override(field)? {
        println!("{}", format!("✅ Removed sidecar for '{}'", field).green());
    } else {
        println!(
            "{}",
            format!("No sidecar file found for '{}'.", field).yellow()
        );
    }

    Ok(())
}
