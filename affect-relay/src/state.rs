//! Shared handler state
//!
//! Everything in here is immutable after startup. The only thing requests
//! share at runtime is the last-payload file behind [`PayloadCache`].

use affect_client::JobPoller;
use affect_core::ScoreGroups;
use std::sync::Arc;

use crate::service::cache::PayloadCache;

#[derive(Clone)]
pub struct AppState {
    pub poller: JobPoller,
    pub groups: Arc<ScoreGroups>,
    pub cache: PayloadCache,
}

impl AppState {
    pub fn new(poller: JobPoller, groups: ScoreGroups, cache: PayloadCache) -> Self {
        Self {
            poller,
            groups: Arc::new(groups),
            cache,
        }
    }
}
