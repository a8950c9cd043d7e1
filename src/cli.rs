//! CLI glue: argument parsing and the async entrypoint shared by `main` and
//! the integration tests. All pipeline logic lives in [`crate::pipeline`].

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::pipeline::{run_draft, run_generate, RunOutcome};

/// CLI for autopost: generate and publish one blog post per run.
#[derive(Parser)]
#[clap(
    name = "autopost",
    version,
    about = "Generate a daily blog post and publish it to Blogger/WordPress"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a post with the configured text model
    Generate {
        /// Site directory holding _posts, assets and drafts
        #[clap(long, default_value = ".")]
        root: PathBuf,
        /// Post even when the daily limit is already reached
        #[clap(long)]
        force: bool,
    },
    /// Convert the next pending draft into a post
    Draft {
        /// Site directory holding _posts, assets and drafts
        #[clap(long, default_value = ".")]
        root: PathBuf,
        /// Post even when the daily limit is already reached
        #[clap(long)]
        force: bool,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    let outcome = match cli.command {
        Commands::Generate { root, force } => {
            let config = Config::load(root, force)?;
            tracing::info!(command = "generate", "Starting run");
            run_generate(&config).await?
        }
        Commands::Draft { root, force } => {
            let config = Config::load(root, force)?;
            tracing::info!(command = "draft", "Starting run");
            run_draft(&config).await?
        }
    };

    match &outcome {
        RunOutcome::Posted { path } => println!("Created {}", path.display()),
        RunOutcome::DailyLimitReached => println!("Daily post limit reached. Exiting."),
        RunOutcome::NoDrafts => println!("No pending drafts. Exiting."),
    }
    tracing::info!(?outcome, "Run complete");
    Ok(())
}
