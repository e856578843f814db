use crate::models::PipelinesConfig;
use crate::store::articles;
use crate::Result;
use colored::Colorize;
use std::path::Path;

pub fn run(root: &Path, pipelines_path: &Path) -> Result<()> {
    let config = PipelinesConfig::load(pipelines_path)?;
    let graph = config.build_graph()?;

    let summary = articles::plan_summary(root, &graph)?;

    println!("{}", "📊 Plan summary".cyan().bold());
    println!();
    println!("   🌱 Seed:        {}", summary.seed);
    println!("   🔨 In progress: {}", summary.in_progress);
    println!("   🚀 Ready:       {}", summary.ready);
    println!("   ✅ Published:   {}", summary.published);
    println!();
    println!("   Total: {} article(s)", summary.total);

    if summary.errors > 0 {
        println!(
            "{}",
            format!("   ⚠️  {} folder(s) could not be read", summary.errors).yellow()
        );
    }

    Ok(())
}
