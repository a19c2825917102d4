//! Relay command handlers

use std::path::PathBuf;

use affect_core::domain::report::{AnalysisReport, Level};
use anyhow::{Context, Result};
use colored::*;

use crate::api::RelayClient;
use crate::config::Config;

/// Request an analysis and print the report
pub async fn analyze_job(config: &Config, job_id: &str) -> Result<()> {
    let client = RelayClient::new(&config.relay_url);

    println!("{}", format!("Analyzing job {}...", job_id).dimmed());
    let report = client.analyze(job_id).await?;

    print_report(&report);
    Ok(())
}

/// Fetch the last raw payload and print or save it
pub async fn download_raw(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let client = RelayClient::new(&config.relay_url);
    let payload = client.download_raw().await?;

    match output {
        Some(path) => {
            tokio::fs::write(&path, payload.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "{} Saved {} bytes to {}",
                "✓".green(),
                payload.len(),
                path.display().to_string().cyan()
            );
        }
        None => println!("{}", payload),
    }

    Ok(())
}

/// Print an analysis report
pub fn print_report(report: &AnalysisReport) {
    println!("{}", "Analysis Report:".bold());
    print_metric("Confidence", report.confidence_score, report.confidence_level);
    print_metric("Nervousness", report.nervousness_score, report.nervousness_level);
    print_metric("Engagement", report.engagement_score, report.engagement_level);
    println!("  Top emotion: {}", report.top_emotion.cyan());
}

fn print_metric(name: &str, score: f64, level: Level) {
    println!(
        "  {:<12} {:.2}  {}",
        format!("{}:", name),
        score,
        colorize_level(level)
    );
}

fn colorize_level(level: Level) -> ColoredString {
    match level {
        Level::High => level.as_str().green(),
        Level::Moderate => level.as_str().yellow(),
        Level::Low => level.as_str().red(),
    }
}
