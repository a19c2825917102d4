//! Error types for the provider client and job poller

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, PollError>;

/// Errors that can end a poll
///
/// Every variant is terminal for the request that triggered the poll. Only the
/// "not yet complete" state is retried, and that never surfaces as an error
/// unless the attempt budget runs out.
#[derive(Debug, Error)]
pub enum PollError {
    /// Caller supplied an unusable job id or poll setting
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Provider settings are unusable, e.g. an unparseable base URL
    #[error("Invalid provider configuration: {0}")]
    Config(String),

    /// Transport failure: connect error, attempt timeout, unreadable body
    #[error("Failed to reach provider: {0}")]
    Connection(String),

    /// Provider does not know the job
    #[error("Job {0} not found")]
    JobNotFound(String),

    /// Provider rejected the credential
    #[error("Provider rejected the API key")]
    Unauthorized,

    /// Provider answered with a 5xx status
    #[error("Provider error (status {status}): {message}")]
    Provider {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Provider reports the job itself as failed
    #[error("Job {job_id} failed: {message}")]
    JobFailed { job_id: String, message: String },

    /// Attempt budget exhausted while the job was still running
    #[error("Job not ready after {attempts} attempt(s)")]
    Timeout { attempts: u32 },
}

impl From<reqwest::Error> for PollError {
    fn from(err: reqwest::Error) -> Self {
        PollError::Connection(err.to_string())
    }
}

impl PollError {
    /// Create a provider error from status code and message
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider {
            status,
            message: message.into(),
        }
    }

    /// Whether a retry could plausibly succeed
    ///
    /// Only consulted when transient retries are switched on.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Provider { .. })
    }

    /// HTTP status a relay should answer with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::Unauthorized => 401,
            Self::JobNotFound(_) => 404,
            Self::Config(_)
            | Self::Connection(_)
            | Self::Provider { .. }
            | Self::JobFailed { .. }
            | Self::Timeout { .. } => 500,
        }
    }
}
