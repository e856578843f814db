use crate::models::Article;
use crate::store::articles;
use crate::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn run(
    root: &Path,
    relative_path: &str,
    title: &str,
    description: &str,
    keywords: Vec<String>,
    content_file: Option<&Path>,
) -> Result<()> {
    let content = match content_file {
        Some(file) => Some(
            std::fs::read_to_string(file)
                .with_context(|| format!("Failed to read {}", file.display()))?,
        ),
        None => None,
    };

    let article = Article::new(title, description).with_keywords(keywords);
    let folder = articles::create(root, relative_path, article, content.as_deref())?;

    println!(
        "{}",
        format!("✅ Created article at {}", folder.path.display()).green()
    );
    println!("   Title:   {}", folder.article.title);
    println!("   Version: {}", folder.article.version);

    Ok(())
}
