use crate::models::{PipelinesConfig, PlanStatus};
use crate::store::{articles, history};
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(path: &Path, pipelines_path: &Path, json: bool) -> Result<()> {
    let Some(article) = articles::read_meta(path)? else {
        if json {
            println!(
                "{{\"error\": \"article_not_found\", \"path\": \"{}\"}}",
                path.display()
            );
        } else {
            println!(
                "{}",
                format!("Article not found at {}", path.display()).red()
            );
        }
        return Ok(());
    };

    let config = PipelinesConfig::load(pipelines_path)?;
    let graph = config.build_graph()?;
    let status = article.plan_status(&graph);
    let entries = history::list_history(path)?;

    if json {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "title": article.title,
            "status": status.name(),
            "last_pipeline": article.last_pipeline,
            "version": article.version,
            "applied_actions": article.applied_actions,
            "next_pipelines": graph.next_states(article.pipeline_state()),
            "history_entries": entries.len(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Status for: {}", path.display()).cyan().bold()
    );
    println!();

    let status_label = match status {
        PlanStatus::Seed => status.name().yellow(),
        PlanStatus::InProgress => status.name().blue(),
        PlanStatus::Ready => status.name().green(),
        PlanStatus::Published => status.name().bright_black(),
    };
    println!("   Status:    {} {}", status.emoji(), status_label);
    println!("   Title:     {}", article.title);
    println!(
        "   Pipeline:  {}",
        article.last_pipeline.as_deref().unwrap_or("seed")
    );
    println!("   Version:   {}", article.version);

    if !article.applied_actions.is_empty() {
        println!("   Applied:   {}", article.applied_actions.join(", "));
    }

    let next = graph.next_states(article.pipeline_state());
    if !next.is_empty() {
        println!("   Next:      {}", next.join(", "));
    }

    if !entries.is_empty() {
        println!("   History:   {} snapshot(s)", entries.len());
    }

    if !article.updated_at.is_empty() {
        println!("   Updated:   {}", article.updated_at);
    }

    Ok(())
}
