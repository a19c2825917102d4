//! Service Module
//!
//! Business logic layer for the relay.
//! Services sit between the HTTP handlers and the provider client.

pub mod analysis;
pub mod cache;

// Re-export for convenience
pub use analysis as analysis_service;
