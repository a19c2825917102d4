//! API client module
//!
//! HTTP client for communicating with the relay.

use affect_core::domain::report::AnalysisReport;
use affect_core::dto::analysis::{AnalyzeRequest, ErrorBody};
use anyhow::{Context, Result};
use reqwest::Client;

/// HTTP client for the relay API
pub struct RelayClient {
    base_url: String,
    client: Client,
}

impl RelayClient {
    /// Create a new relay client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the relay
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Request an analysis of a job
    ///
    /// The relay polls the provider on our behalf, so this call may take as
    /// long as the relay's full poll budget.
    pub async fn analyze(&self, job_id: &str) -> Result<AnalysisReport> {
        let url = format!("{}/analyze", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&AnalyzeRequest::new(job_id))
            .send()
            .await
            .context("Failed to send analyze request")?;

        let body = Self::handle_response(response).await?;
        serde_json::from_str(&body).context("Failed to parse analysis report")
    }

    /// Download the most recent raw provider payload
    pub async fn download_raw(&self) -> Result<String> {
        let url = format!("{}/analyze/raw", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send raw payload request")?;

        Self::handle_response(response).await
    }

    /// Check a response status and return its body
    ///
    /// Failed requests surface the relay's `{"error": ...}` message when the
    /// body carries one.
    async fn handle_response(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let text = response.text().await.context("Failed to read response body")?;

        if !status.is_success() {
            anyhow::bail!("Request failed with status {}: {}", status, error_message(&text));
        }

        Ok(text)
    }
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) => error,
        Err(_) => body.trim().to_string(),
    }
}
