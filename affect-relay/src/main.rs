//! Affect Relay
//!
//! HTTP relay in front of an emotion-recognition batch API. For each request
//! it polls the provider until the job's predictions are ready, keeps a copy
//! of the raw payload, and answers with confidence, nervousness and
//! engagement scores plus the dominant emotion.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use affect_client::{JobPoller, ProviderClient};

pub mod api;
pub mod config;
pub mod service;
pub mod state;

use crate::config::Config;
use crate::service::cache::PayloadCache;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "affect_relay=debug,affect_client=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Affect Relay...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        provider = %config.provider_base_url,
        max_attempts = config.max_attempts,
        attempt_timeout = ?config.attempt_timeout,
        retry_interval = ?config.retry_interval,
        retry_transient = config.retry_transient,
        "Loaded configuration"
    );

    let client = ProviderClient::new(config.provider_config())
        .context("Failed to build provider client")?;
    let settings = config.poll_settings()?;

    tracing::info!("Worst-case poll duration: {:?}", settings.worst_case());

    let poller = JobPoller::new(Arc::new(client), settings);
    let state = AppState::new(
        poller,
        config.score_groups(),
        PayloadCache::new(&config.raw_payload_path),
    );

    // Build router with all API endpoints
    let app = api::create_router(state);

    let addr = config.bind_addr();
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated unexpectedly")?;

    Ok(())
}
