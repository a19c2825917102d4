//! Prediction endpoint

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use tracing::debug;

use crate::error::Result;
use crate::poller::PredictionSource;
use crate::{API_KEY_HEADER, ProviderClient, ProviderResponse};

impl ProviderClient {
    /// Fetch the predictions resource for a job
    ///
    /// Any HTTP status is returned as a [`ProviderResponse`]; only transport
    /// failures become errors. Interpreting the status is left to
    /// [`crate::classify`].
    pub async fn fetch_predictions(&self, job_id: &str) -> Result<ProviderResponse> {
        let url = self.predictions_url(job_id)?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(job_id, status, bytes = body.len(), "Provider responded");

        Ok(ProviderResponse { status, body })
    }
}

#[async_trait]
impl PredictionSource for ProviderClient {
    async fn fetch(&self, job_id: &str) -> Result<ProviderResponse> {
        self.fetch_predictions(job_id).await
    }
}
