//! Score groups
//!
//! A score group is a fixed set of label names whose per-frame mean feeds one
//! summary metric. Matching is case-insensitive.

use crate::domain::frame::Frame;

pub const DEFAULT_CONFIDENCE_LABELS: [&str; 3] = ["calm", "focused", "content"];
pub const DEFAULT_NERVOUSNESS_LABELS: [&str; 3] = ["nervous", "worried", "tense"];

/// Immutable label sets for the confidence and nervousness metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreGroups {
    confidence: Vec<String>,
    nervousness: Vec<String>,
}

impl ScoreGroups {
    /// Builds groups from label lists; labels are normalized to lowercase
    pub fn new<C, N>(confidence: C, nervousness: N) -> Self
    where
        C: IntoIterator,
        C::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: AsRef<str>,
    {
        Self {
            confidence: normalize(confidence),
            nervousness: normalize(nervousness),
        }
    }

    /// Parses comma-separated label lists, dropping blanks
    pub fn from_csv(confidence: &str, nervousness: &str) -> Self {
        Self::new(confidence.split(','), nervousness.split(','))
    }

    pub fn confidence(&self) -> &[String] {
        &self.confidence
    }

    pub fn nervousness(&self) -> &[String] {
        &self.nervousness
    }

    pub fn is_empty(&self) -> bool {
        self.confidence.is_empty() || self.nervousness.is_empty()
    }

    /// Mean of the frame's confidence-group scores, 0 when none match
    pub fn confidence_mean(&self, frame: &Frame) -> f64 {
        group_mean(&self.confidence, frame)
    }

    /// Mean of the frame's nervousness-group scores, 0 when none match
    pub fn nervousness_mean(&self, frame: &Frame) -> f64 {
        group_mean(&self.nervousness, frame)
    }
}

impl Default for ScoreGroups {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_LABELS, DEFAULT_NERVOUSNESS_LABELS)
    }
}

fn normalize<I>(labels: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for label in labels {
        let label = label.as_ref().trim().to_lowercase();
        if !label.is_empty() && !out.contains(&label) {
            out.push(label);
        }
    }
    out
}

fn group_mean(labels: &[String], frame: &Frame) -> f64 {
    let mut sum = 0.0;
    let mut matched = 0usize;
    for emotion in &frame.emotions {
        // Labels are stored lowercased, so fold the name the same way
        let name = emotion.name.to_lowercase();
        if labels.iter().any(|l| *l == name) {
            sum += emotion.score;
            matched += 1;
        }
    }
    if matched == 0 { 0.0 } else { sum / matched as f64 }
}
