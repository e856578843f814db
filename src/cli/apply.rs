use crate::models::PipelinesConfig;
use crate::store::articles::{self, TransitionUpdate};
use crate::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub struct ApplyArgs<'a> {
    pub path: &'a Path,
    pub content_file: &'a Path,
    pub label: &'a str,
    pub pipeline: Option<&'a str>,
    pub meta: Option<&'a str>,
    pub prompt_file: Option<&'a Path>,
    pub response_file: Option<&'a Path>,
    pub pipelines: &'a Path,
}

pub fn run(args: ApplyArgs<'_>) -> Result<()> {
    let config = PipelinesConfig::load(args.pipelines)?;
    let graph = config.build_graph()?;

    let content = std::fs::read_to_string(args.content_file)
        .with_context(|| format!("Failed to read {}", args.content_file.display()))?;
    let prompt = read_optional(args.prompt_file)?;
    let response = read_optional(args.response_file)?;

    let meta_updates = match args.meta {
        Some(raw) => Some(
            serde_json::from_str(raw).context("--meta must be a JSON object")?,
        ),
        None => None,
    };

    let saved = articles::save_with_pipeline_transition(
        args.path,
        TransitionUpdate {
            content: &content,
            pipeline: args.pipeline,
            archive_label: args.label,
            meta_updates,
            prompt: prompt.as_deref(),
            response: response.as_deref(),
        },
        &graph,
    )?;

    println!(
        "{}",
        format!("✅ Saved {} (v{})", args.path.display(), saved.version).green()
    );
    println!(
        "   Pipeline: {}",
        saved.last_pipeline.as_deref().unwrap_or("seed")
    );

    Ok(())
}

fn read_optional(path: Option<&Path>) -> Result<Option<String>> {
    match path {
        Some(path) => Ok(Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        )),
        None => Ok(None),
    }
}
