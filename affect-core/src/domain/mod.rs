//! Core domain types
//!
//! These types describe what the relay observes from the provider (job state,
//! frames of emotion predictions) and what it hands back (the analysis report).

pub mod frame;
pub mod job;
pub mod report;
