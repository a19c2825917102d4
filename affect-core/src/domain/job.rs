//! Job domain types

use serde::{Deserialize, Serialize};

/// Lifecycle state of a provider-side batch job
///
/// The relay never creates jobs. It only observes a snapshot of the
/// provider's record on each poll attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Running,
    Done,
    Failed,
    NotFound,
    Unauthorized,
}

impl JobState {
    /// Whether polling should stop on this state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Pending | JobState::Running)
    }

    /// Maps the provider's job-details status string onto a state
    ///
    /// Unknown strings are treated as still pending so the poller keeps waiting.
    pub fn from_provider_status(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "QUEUED" => JobState::Pending,
            "IN_PROGRESS" | "COMPLETED" => JobState::Running,
            "FAILED" => JobState::Failed,
            _ => JobState::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!JobState::Pending.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Done.is_terminal());
        assert!(JobState::Failed.is_terminal());
        assert!(JobState::NotFound.is_terminal());
        assert!(JobState::Unauthorized.is_terminal());
    }

    #[test]
    fn test_from_provider_status() {
        assert_eq!(JobState::from_provider_status("QUEUED"), JobState::Pending);
        assert_eq!(JobState::from_provider_status("in_progress"), JobState::Running);
        // Completed without predictions in the body still needs another look
        assert_eq!(JobState::from_provider_status("COMPLETED"), JobState::Running);
        assert_eq!(JobState::from_provider_status("FAILED"), JobState::Failed);
        assert_eq!(JobState::from_provider_status("weird"), JobState::Pending);
    }
}
