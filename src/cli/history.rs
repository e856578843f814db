use crate::store::{articles, history};
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    articles::ensure_not_legacy(path)?;

    let entries = history::list_history(path)?;
    if entries.is_empty() {
        println!("{}", "No archived snapshots.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("History for: {}", path.display()).cyan().bold()
    );
    println!();
    for entry in &entries {
        println!("   {}  {}", entry.timestamp, entry.action.bold());
    }
    println!("\nTotal: {} snapshot(s)", entries.len());

    Ok(())
}
