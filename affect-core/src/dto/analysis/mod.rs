//! Analysis DTOs

use serde::{Deserialize, Serialize};

/// Inbound analysis request
///
/// Used both as a query string and as a JSON body. The id is optional at the
/// type level so a missing one can be reported as a request error rather than
/// a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub job_id: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: Some(job_id.into()),
        }
    }

    /// The trimmed job id, if present and non-blank
    pub fn job_id(&self) -> Option<&str> {
        self.job_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

/// Error body returned for every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
