//! Affect CLI
//!
//! Command-line interface for the affect relay. Requests analyses, downloads
//! the last raw payload, and scores saved payloads offline.

mod api;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "affect")]
#[command(about = "Emotion analysis relay CLI", long_about = None)]
struct Cli {
    /// Relay URL
    #[arg(long, env = "AFFECT_RELAY_URL", default_value = "http://localhost:10000")]
    relay_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::new(cli.relay_url);

    handle_command(cli.command, &config).await
}
