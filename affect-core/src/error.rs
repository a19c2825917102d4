//! Error types for scoring

use thiserror::Error;

/// Errors that can occur while turning a provider payload into a report
#[derive(Debug, Error)]
pub enum AggregationError {
    /// Every frame was empty, or there were no frames at all
    #[error("No valid frames found in predictions")]
    NoValidFrames,

    /// The payload did not have the expected prediction shape
    #[error("Invalid data format: {0}")]
    MalformedPayload(String),
}

impl From<serde_json::Error> for AggregationError {
    fn from(err: serde_json::Error) -> Self {
        AggregationError::MalformedPayload(err.to_string())
    }
}
