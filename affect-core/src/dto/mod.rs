//! Data Transfer Objects
//!
//! Request and response bodies exchanged between the relay and its callers.

pub mod analysis;
