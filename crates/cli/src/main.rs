use anyhow::Context;
use clap::{Parser, Subcommand};
use nbhistory_core::config::{commit_identity_from_env_values, history_suffix_from_env_value};
use nbhistory_core::{CommitMessage, CoreConfig, NotebookHistory, SnapshotInfo, VersionControl};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "nbhistory", version)]
#[command(about = "Keep a git-backed history of notebooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the current state of a notebook to its history
    Save {
        /// Filenames to save
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Save description
        #[arg(short, long)]
        message: String,
    },
    /// Restore to the last saved version of the notebook
    Load {
        /// Filenames to load
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Forget the most recently saved notebook, and go back to the previous one
    Revert {
        /// Filenames to revert
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List saved versions, newest first
    Log {
        /// Filenames to list
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

/// Resolve core configuration from the process environment (after `.env` is loaded).
///
/// # Environment Variables
/// - `NBHISTORY_AUTHOR_NAME` / `NBHISTORY_AUTHOR_EMAIL`: commit identity (set both or neither)
/// - `NBHISTORY_HISTORY_SUFFIX`: history directory suffix (default: ".history")
fn load_config() -> anyhow::Result<CoreConfig> {
    let author = commit_identity_from_env_values(
        std::env::var("NBHISTORY_AUTHOR_NAME").ok(),
        std::env::var("NBHISTORY_AUTHOR_EMAIL").ok(),
    )?;
    let suffix = history_suffix_from_env_value(std::env::var("NBHISTORY_HISTORY_SUFFIX").ok());
    Ok(CoreConfig::new(suffix, author)?)
}

/// One `log` entry: short id, commit time, author, summary.
fn log_line(snapshot: &SnapshotInfo) -> String {
    format!(
        "{} {} {}: {}",
        snapshot.short_id(),
        snapshot.time.format("%Y-%m-%d %H:%M:%S"),
        snapshot.author,
        snapshot.summary
    )
}

/// Run one command over its files in order. The first failure stops the batch; files before it
/// keep their new state and files after it are not touched.
fn run<B: VersionControl>(history: &NotebookHistory<B>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Save { files, message } => {
            let message = CommitMessage::new(&message)?;
            for file in &files {
                history
                    .save(file, &message)
                    .with_context(|| format!("failed to save {}", file.display()))?;
            }
        }
        Commands::Load { files } => {
            for file in &files {
                history
                    .load(file)
                    .with_context(|| format!("failed to load {}", file.display()))?;
            }
        }
        Commands::Revert { files } => {
            for file in &files {
                history
                    .revert(file)
                    .with_context(|| format!("failed to revert {}", file.display()))?;
            }
        }
        Commands::Log { files } => {
            for file in &files {
                let snapshots = history
                    .history(file)
                    .with_context(|| format!("failed to read history of {}", file.display()))?;
                println!("{}:", file.display());
                for snapshot in &snapshots {
                    println!("  {}", log_line(snapshot));
                }
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("nbhistory=info".parse()?)
                .add_directive("nbhistory_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config()?;
    tracing::debug!("history directories use suffix {}", config.history_suffix());

    let history = NotebookHistory::new(config);
    run(&history, cli.command)
}
