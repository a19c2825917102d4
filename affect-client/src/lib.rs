//! Affect Provider Client
//!
//! HTTP client for an emotion-recognition batch API, plus the poller that
//! waits for a batch job to finish.
//!
//! # Example
//!
//! ```no_run
//! use affect_client::{JobPoller, PollSettings, ProviderClient, ProviderConfig};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), affect_client::PollError> {
//!     let client = ProviderClient::new(ProviderConfig::new("https://api.hume.ai", "secret"))?;
//!     let settings = PollSettings::new(10, Duration::from_secs(30), Duration::from_secs(5))?;
//!     let poller = JobPoller::new(Arc::new(client), settings);
//!
//!     let payload = poller.poll("job-123").await?;
//!     println!("Fetched {} bytes", payload.len());
//!     Ok(())
//! }
//! ```

pub mod classify;
pub mod error;
pub mod poller;
mod predictions;

pub use classify::{Observation, classify};
pub use error::{PollError, Result};
pub use poller::{JobPoller, PollSettings, PredictionSource};

use reqwest::{Client, Url};
use std::time::Duration;

/// Header carrying the static provider credential
pub const API_KEY_HEADER: &str = "X-Hume-Api-Key";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw provider response for one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: String,
}

impl ProviderResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Untouched body of a completed prediction response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPayload(String);

impl RawPayload {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Connection settings for the provider
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider (e.g., "https://api.hume.ai")
    pub base_url: String,
    /// Static credential sent with every request
    pub api_key: String,
    /// Timeout applied to each HTTP request
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the provider's batch job API
#[derive(Clone)]
pub struct ProviderClient {
    /// Base URL without trailing slash
    base_url: String,
    api_key: String,
    /// HTTP client instance
    client: Client,
}

impl ProviderClient {
    /// Create a new provider client
    ///
    /// The configured timeout is applied to every request made by the
    /// underlying reqwest client. An unusable base URL is rejected here
    /// rather than on the first request.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let provider = Self::with_client(config.base_url, config.api_key, client);
        provider.parsed_base_url()?;
        Ok(provider)
    }

    /// Create a new provider client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, etc.
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        }
    }

    /// Get the base URL of the provider
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL of the predictions resource for a job
    ///
    /// The job id is percent-encoded as a single path segment.
    pub fn predictions_url(&self, job_id: &str) -> Result<Url> {
        let mut url = self.parsed_base_url()?;
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v0", "batch", "jobs", job_id, "predictions"]);
        }
        Ok(url)
    }

    fn parsed_base_url(&self) -> Result<Url> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| PollError::Config(format!("invalid provider URL: {}", e)))?;
        if url.cannot_be_a_base() {
            return Err(PollError::Config(
                "provider URL cannot be a base".to_string(),
            ));
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
