//! Affect Core
//!
//! Core types and the scoring pipeline for the affect relay.
//!
//! This crate contains:
//! - Domain types: provider job state, frames, metrics and the final report
//! - DTOs: request/response bodies shared by the relay and the CLI
//! - Aggregation: the per-frame reduction into summary metrics
//! - Frame sources: materialized and streaming readers over provider payloads

pub mod aggregate;
pub mod domain;
pub mod dto;
pub mod error;
pub mod frames;
pub mod groups;

pub use aggregate::{Aggregate, aggregate};
pub use error::AggregationError;
pub use groups::ScoreGroups;
