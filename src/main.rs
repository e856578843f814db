use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use contentd::Result;
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contentd")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Filesystem-backed content store with pipeline lifecycle management", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new seed article
    Create {
        /// Path of the new article folder, relative to the root
        relative_path: String,

        /// Article title
        #[arg(short, long)]
        title: String,

        /// Article description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Keyword (repeatable)
        #[arg(short, long = "keyword")]
        keywords: Vec<String>,

        /// File whose contents become the initial article content
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Articles root directory
        #[arg(short, long, default_value = "articles")]
        root: PathBuf,
    },

    /// List articles, optionally filtered by pipeline state
    List {
        /// Only articles whose last pipeline is NAME
        #[arg(short, long)]
        pipeline: Option<String>,

        /// Only seed articles (never processed)
        #[arg(long, conflicts_with = "pipeline")]
        seed: bool,

        /// Articles root directory
        #[arg(short, long, default_value = "articles")]
        root: PathBuf,

        /// Pipeline definitions file
        #[arg(long, default_value = "pipelines.yaml")]
        pipelines: PathBuf,
    },

    /// Show one article's state
    Status {
        /// Article folder path
        path: PathBuf,

        /// Output in JSON format
        #[arg(short, long)]
        json: bool,

        /// Pipeline definitions file
        #[arg(long, default_value = "pipelines.yaml")]
        pipelines: PathBuf,
    },

    /// Show status counts over the whole article root
    Summary {
        /// Articles root directory
        #[arg(short, long, default_value = "articles")]
        root: PathBuf,

        /// Pipeline definitions file
        #[arg(long, default_value = "pipelines.yaml")]
        pipelines: PathBuf,
    },

    /// List an article's archived snapshots
    History {
        /// Article folder path
        path: PathBuf,
    },

    /// Record a pipeline result: archive, transition, and write
    Apply {
        /// Article folder path
        path: PathBuf,

        /// File whose contents become the new article content
        #[arg(long)]
        content_file: PathBuf,

        /// Action label for the archive folder
        #[arg(short, long)]
        label: String,

        /// Pipeline to record in last_pipeline (omit to keep the current one)
        #[arg(long)]
        pipeline: Option<String>,

        /// Extra metadata to merge, as a JSON object
        #[arg(long)]
        meta: Option<String>,

        /// File holding the prompt that produced this mutation
        #[arg(long)]
        prompt_file: Option<PathBuf>,

        /// File holding the raw model response
        #[arg(long)]
        response_file: Option<PathBuf>,

        /// Pipeline definitions file
        #[arg(long, default_value = "pipelines.yaml")]
        pipelines: PathBuf,
    },

    /// Check articles against their pipelines' expected actions
    Verify {
        /// Revert drifted articles to their pipeline's prerequisite state
        #[arg(long)]
        repair: bool,

        /// Articles root directory
        #[arg(short, long, default_value = "articles")]
        root: PathBuf,

        /// Pipeline definitions file
        #[arg(long, default_value = "pipelines.yaml")]
        pipelines: PathBuf,
    },

    /// Manage sidecar override files
    #[command(subcommand)]
    Override(OverrideCommands),

    /// Delete an article folder
    Delete {
        /// Article folder path
        path: PathBuf,

        /// Actually delete (required)
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum OverrideCommands {
    /// Export a field's current value into a sidecar file
    Add {
        /// Article folder path
        path: PathBuf,

        /// Field to export
        field: String,

        /// Sidecar format
        #[arg(long, default_value = "md", value_parser = ["md", "json"])]
        format: String,
    },

    /// Delete a field's sidecar file
    Remove {
        /// Article folder path
        path: PathBuf,

        /// Field whose sidecar to delete
        field: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}", format!("Error: {}", e).red());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Create {
            relative_path,
            title,
            description,
            keywords,
            content_file,
            root,
        } => {
            contentd::cli::create::run(
                &root,
                &relative_path,
                &title,
                &description,
                keywords,
                content_file.as_deref(),
            )?;
        }

        Commands::List {
            pipeline,
            seed,
            root,
            pipelines,
        } => {
            contentd::cli::list::run(&root, &pipelines, pipeline.as_deref(), seed)?;
        }

        Commands::Status {
            path,
            json,
            pipelines,
        } => {
            contentd::cli::status::run(&path, &pipelines, json)?;
        }

        Commands::Summary { root, pipelines } => {
            contentd::cli::summary::run(&root, &pipelines)?;
        }

        Commands::History { path } => {
            contentd::cli::history::run(&path)?;
        }

        Commands::Apply {
            path,
            content_file,
            label,
            pipeline,
            meta,
            prompt_file,
            response_file,
            pipelines,
        } => {
            contentd::cli::apply::run(contentd::cli::apply::ApplyArgs {
                path: &path,
                content_file: &content_file,
                label: &label,
                pipeline: pipeline.as_deref(),
                meta: meta.as_deref(),
                prompt_file: prompt_file.as_deref(),
                response_file: response_file.as_deref(),
                pipelines: &pipelines,
            })?;
        }

        Commands::Verify {
            repair,
            root,
            pipelines,
        } => {
            contentd::cli::verify::run(&root, &pipelines, repair)?;
        }

        Commands::Override(cmd) => match cmd {
            OverrideCommands::Add {
                path,
                field,
                format,
            } => {
                contentd::cli::overrides::run_add(&path, &field, &format)?;
            }
            OverrideCommands::Remove { path, field } => {
                contentd::cli::overrides::run_remove(&path, &field)?;
            }
        },

        Commands::Delete { path, force } => {
            contentd::cli::delete::run(&path, force)?;
        }

        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "contentd", &mut io::stdout());
        }
    }

    Ok(())
}
