use crate::models::PipelinesConfig;
use crate::store::articles;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(
    root: &Path,
    pipelines_path: &Path,
    pipeline: Option<&str>,
    seed: bool,
) -> Result<()> {
    println!("{}", "📋 Listing articles...".cyan());

    let outcome = if seed {
        articles::by_pipeline(root, &[None])?
    } else if let Some(name) = pipeline {
        articles::by_pipeline(root, &[Some(name.to_string())])?
    } else {
        articles::scan(root)?
    };

    if outcome.folders.is_empty() && outcome.errors.is_empty() {
        println!("{}", "No articles found.".yellow());
        return Ok(());
    }

    // The graph is only needed to decorate publishable states; listing works
    // without a config file.
    let graph = PipelinesConfig::load(pipelines_path)
        .ok()
        .and_then(|config| config.build_graph().ok());

    for folder in &outcome.folders {
        let state = folder
            .article
            .last_pipeline
            .as_deref()
            .unwrap_or("seed")
            .to_string();
        let state = match &graph {
            Some(graph) if graph.is_publishable(folder.article.last_pipeline.as_deref()) => {
                state.green().to_string()
            }
            _ => state,
        };
        println!(
            "   • {}  [{}  v{}]",
            folder.path.display(),
            state,
            folder.article.version
        );
    }

    for error in &outcome.errors {
        eprintln!(
            "{}",
            format!(
                "⚠️  Skipping malformed folder {}: {}",
                error.path.display(),
                error.message
            )
            .yellow()
        );
    }

    println!("\nTotal: {} article(s)", outcome.folders.len());
    Ok(())
}
