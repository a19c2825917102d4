//! API Module
//!
//! HTTP API layer for the relay.

pub mod analysis;
pub mod error;
pub mod health;

use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Analysis endpoints
        .route("/analyze", get(analysis::analyze).post(analysis::analyze))
        .route("/analyze/raw", get(analysis::download_raw))
        // Add state and middleware
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
