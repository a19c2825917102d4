//! Configuration module
//!
//! Handles CLI configuration.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the relay service, without trailing slash
    pub relay_url: String,
}

impl Config {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into().trim_end_matches('/').to_string(),
        }
    }
}
