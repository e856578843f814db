use crate::store::articles;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(path: &Path, force: bool) -> Result<()> {
    if !force {
        println!(
            "{}",
            "Deletion is permanent (no tombstones). Re-run with --force to confirm.".yellow()
        );
        return Ok(());
    }

    if articles::read_meta(path)?.is_none() {
        anyhow::bail!("No article found at {}", path.display());
    }

    articles::delete(path)?;
    println!("{}", format!("🗑️  Deleted {}", path.display()).green());

    Ok(())
}
