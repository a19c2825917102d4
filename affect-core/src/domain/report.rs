//! Report domain types

use serde::{Deserialize, Serialize};

/// Categorical bucket derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    High,
    Moderate,
    Low,
}

impl Level {
    /// `High` at 0.7 and above, `Moderate` at 0.4 and above, `Low` otherwise
    pub fn from_score(score: f64) -> Self {
        if score >= 0.7 {
            Level::High
        } else if score >= 0.4 {
            Level::Moderate
        } else {
            Level::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::High => "High",
            Level::Moderate => "Moderate",
            Level::Low => "Low",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rounded score paired with its level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metric {
    pub score: f64,
    pub level: Level,
}

impl Metric {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            level: Level::from_score(score),
        }
    }
}

/// Final output of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub confidence_score: f64,
    pub confidence_level: Level,
    pub nervousness_score: f64,
    pub nervousness_level: Level,
    pub engagement_score: f64,
    pub engagement_level: Level,
    pub top_emotion: String,
}

impl AnalysisReport {
    pub fn new(
        confidence: Metric,
        nervousness: Metric,
        engagement: Metric,
        top_emotion: String,
    ) -> Self {
        Self {
            confidence_score: confidence.score,
            confidence_level: confidence.level,
            nervousness_score: nervousness.score,
            nervousness_level: nervousness.level,
            engagement_score: engagement.score,
            engagement_level: engagement.level,
            top_emotion,
        }
    }
}

/// Rounds to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
