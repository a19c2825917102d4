//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod analyze;
mod score;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Ask the relay to analyze a provider job
    Analyze {
        /// Provider job ID
        job_id: String,
    },
    /// Download the last raw provider payload kept by the relay
    Raw {
        /// Write the payload to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Score a saved payload locally without contacting the relay
    Score {
        /// Path to a predictions payload
        file: PathBuf,

        /// Comma-separated confidence labels
        #[arg(long)]
        confidence: Option<String>,

        /// Comma-separated nervousness labels
        #[arg(long)]
        nervousness: Option<String>,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Analyze { job_id } => analyze::analyze_job(config, &job_id).await,
        Commands::Raw { output } => analyze::download_raw(config, output).await,
        Commands::Score {
            file,
            confidence,
            nervousness,
        } => score::score_file(&file, confidence.as_deref(), nervousness.as_deref()),
    }
}
