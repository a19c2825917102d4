//! Offline scoring
//!
//! Runs the same aggregation the relay does over a payload saved on disk,
//! e.g. one fetched with `affect raw --output`.

use std::path::Path;

use affect_core::domain::report::AnalysisReport;
use affect_core::frames::PredictionBatch;
use affect_core::groups::{DEFAULT_CONFIDENCE_LABELS, DEFAULT_NERVOUSNESS_LABELS};
use affect_core::{ScoreGroups, aggregate};
use anyhow::{Context, Result};
use colored::*;

use super::analyze::print_report;

/// Score a payload file and print the report
pub fn score_file(path: &Path, confidence: Option<&str>, nervousness: Option<&str>) -> Result<()> {
    let groups = score_groups(confidence, nervousness);
    let (frames, report) = score_path(path, &groups)?;

    println!(
        "{}",
        format!("Scored {} frame(s) from {}", frames, path.display()).dimmed()
    );
    print_report(&report);
    Ok(())
}

fn score_groups(confidence: Option<&str>, nervousness: Option<&str>) -> ScoreGroups {
    let defaults = (
        DEFAULT_CONFIDENCE_LABELS.join(","),
        DEFAULT_NERVOUSNESS_LABELS.join(","),
    );
    ScoreGroups::from_csv(
        confidence.unwrap_or(&defaults.0),
        nervousness.unwrap_or(&defaults.1),
    )
}

/// Returns the number of non-empty frames and the report
fn score_path(path: &Path, groups: &ScoreGroups) -> Result<(usize, AnalysisReport)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let batch = PredictionBatch::from_slice(&bytes)
        .with_context(|| format!("{} is not a predictions payload", path.display()))?;

    let frames = batch.frames().filter(|frame| !frame.is_empty()).count();
    let report = aggregate(batch.frames(), groups)?;
    Ok((frames, report))
}
