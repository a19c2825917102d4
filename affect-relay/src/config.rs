//! Relay configuration
//!
//! Defines every tunable of the relay: provider connection, poll budget,
//! listen port, cache location and score-group labels. Loaded once at
//! startup and passed by value into the components that need it.

use affect_client::{PollSettings, ProviderClient, ProviderConfig};
use affect_core::ScoreGroups;
use affect_core::groups::{DEFAULT_CONFIDENCE_LABELS, DEFAULT_NERVOUSNESS_LABELS};
use std::time::Duration;

/// Relay configuration
#[derive(Clone)]
pub struct Config {
    /// Provider credential, sent as a request header
    pub api_key: String,

    /// Provider base URL (e.g., "https://api.hume.ai")
    pub provider_base_url: String,

    /// Port to listen on (bound on all interfaces)
    pub port: u16,

    /// Maximum number of predictions fetches per request
    pub max_attempts: u32,

    /// Timeout for each fetch
    pub attempt_timeout: Duration,

    /// Sleep between fetches while the job is not ready
    pub retry_interval: Duration,

    /// Sleep before the first fetch
    pub initial_delay: Duration,

    /// Retry 5xx and transport failures instead of failing at once
    pub retry_transient: bool,

    /// File holding the most recent raw provider payload
    pub raw_payload_path: String,

    /// Comma-separated confidence-group labels
    pub confidence_labels: String,

    /// Comma-separated nervousness-group labels
    pub nervousness_labels: String,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            provider_base_url: "https://api.hume.ai".to_string(),
            port: 10000,
            max_attempts: 10,
            attempt_timeout: Duration::from_secs(30),
            retry_interval: Duration::from_secs(5),
            initial_delay: Duration::ZERO,
            retry_transient: false,
            raw_payload_path: "last_response.json".to_string(),
            confidence_labels: DEFAULT_CONFIDENCE_LABELS.join(","),
            nervousness_labels: DEFAULT_NERVOUSNESS_LABELS.join(","),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - HUME_API_KEY (required)
    /// - PROVIDER_BASE_URL (optional, default: https://api.hume.ai)
    /// - PORT (optional, default: 10000)
    /// - POLL_MAX_ATTEMPTS (optional, default: 10)
    /// - POLL_ATTEMPT_TIMEOUT (optional, seconds, default: 30)
    /// - POLL_RETRY_INTERVAL (optional, seconds, default: 5)
    /// - POLL_INITIAL_DELAY (optional, seconds, default: 0)
    /// - POLL_RETRY_TRANSIENT (optional, true/false, default: false)
    /// - RAW_PAYLOAD_PATH (optional, default: last_response.json)
    /// - CONFIDENCE_LABELS (optional, comma-separated)
    /// - NERVOUSNESS_LABELS (optional, comma-separated)
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("HUME_API_KEY")
            .ok_or_else(|| anyhow::anyhow!("HUME_API_KEY environment variable not set"))?;

        let mut config = Self::new(api_key);

        if let Some(url) = lookup("PROVIDER_BASE_URL") {
            config.provider_base_url = url;
        }

        config.port = lookup("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(config.port);

        config.max_attempts = lookup("POLL_MAX_ATTEMPTS")
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(config.max_attempts);

        config.attempt_timeout = lookup("POLL_ATTEMPT_TIMEOUT")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.attempt_timeout);

        config.retry_interval = lookup("POLL_RETRY_INTERVAL")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.retry_interval);

        config.initial_delay = lookup("POLL_INITIAL_DELAY")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(config.initial_delay);

        config.retry_transient = lookup("POLL_RETRY_TRANSIENT")
            .and_then(|s| parse_bool(&s))
            .unwrap_or(config.retry_transient);

        if let Some(path) = lookup("RAW_PAYLOAD_PATH") {
            config.raw_payload_path = path;
        }

        if let Some(labels) = lookup("CONFIDENCE_LABELS") {
            config.confidence_labels = labels;
        }

        if let Some(labels) = lookup("NERVOUSNESS_LABELS") {
            config.nervousness_labels = labels;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            anyhow::bail!("api_key cannot be empty");
        }

        if !self.provider_base_url.starts_with("http://")
            && !self.provider_base_url.starts_with("https://")
        {
            anyhow::bail!("provider_base_url must start with http:// or https://");
        }

        ProviderClient::new(self.provider_config())
            .map_err(|e| anyhow::anyhow!("provider_base_url is unusable: {}", e))?;

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be at least 1");
        }

        if self.attempt_timeout.is_zero() {
            anyhow::bail!("attempt_timeout must be greater than 0");
        }

        if self.raw_payload_path.trim().is_empty() {
            anyhow::bail!("raw_payload_path cannot be empty");
        }

        if self.score_groups().is_empty() {
            anyhow::bail!("confidence and nervousness label groups cannot be empty");
        }

        Ok(())
    }

    /// Address the server binds to
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(self.provider_base_url.clone(), self.api_key.clone())
            .with_timeout(self.attempt_timeout)
    }

    pub fn poll_settings(&self) -> anyhow::Result<PollSettings> {
        let settings = PollSettings::new(self.max_attempts, self.attempt_timeout, self.retry_interval)?
            .with_initial_delay(self.initial_delay)
            .with_retry_transient(self.retry_transient);
        Ok(settings)
    }

    pub fn score_groups(&self) -> ScoreGroups {
        ScoreGroups::from_csv(&self.confidence_labels, &self.nervousness_labels)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("provider_base_url", &self.provider_base_url)
            .field("port", &self.port)
            .field("max_attempts", &self.max_attempts)
            .field("attempt_timeout", &self.attempt_timeout)
            .field("retry_interval", &self.retry_interval)
            .field("initial_delay", &self.initial_delay)
            .field("retry_transient", &self.retry_transient)
            .field("raw_payload_path", &self.raw_payload_path)
            .field("confidence_labels", &self.confidence_labels)
            .field("nervousness_labels", &self.nervousness_labels)
            .finish()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
