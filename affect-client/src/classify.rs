//! Provider response classification
//!
//! Maps one provider response onto a job state. Completion is detected with
//! probe types that skip the prediction subtree, so classifying a large
//! payload does not build its frames.

use std::fmt;
use std::marker::PhantomData;

use affect_core::domain::job::JobState;
use serde::Deserialize;
use serde::de::{Deserializer, IgnoredAny, SeqAccess, Visitor};

use crate::{ProviderResponse, RawPayload};

/// Longest provider message kept for logs and error bodies
const MAX_MESSAGE_LEN: usize = 512;

/// What one provider response says about the job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// HTTP status of the response
    pub status: u16,
    pub state: JobState,
    /// Present only when `state` is [`JobState::Done`]
    pub payload: Option<RawPayload>,
    /// Provider-supplied detail, truncated
    pub message: Option<String>,
}

impl Observation {
    fn new(status: u16, state: JobState) -> Self {
        Self {
            status,
            state,
            payload: None,
            message: None,
        }
    }

    fn with_message(mut self, message: impl AsRef<str>) -> Self {
        let message = message.as_ref().trim();
        if !message.is_empty() {
            self.message = Some(truncate(message));
        }
        self
    }
}

/// Classifies a provider response
///
/// - 2xx with a batch whose first entry has `results.predictions` is done
/// - 2xx with job details reports the provider's own status
/// - 401 and 404 map to their states
/// - 5xx is a failure
/// - anything else means the job is not ready yet
pub fn classify(response: ProviderResponse) -> Observation {
    let ProviderResponse { status, body } = response;
    match status {
        200..=299 => classify_body(status, body),
        401 => Observation::new(status, JobState::Unauthorized).with_message(&body),
        404 => Observation::new(status, JobState::NotFound).with_message(&body),
        500..=599 => Observation::new(status, JobState::Failed).with_message(&body),
        _ => Observation::new(status, JobState::Pending).with_message(&body),
    }
}

fn classify_body(status: u16, body: String) -> Observation {
    if let Ok(First(entry)) = serde_json::from_str::<First<EntryProbe>>(&body) {
        return match entry {
            Some(EntryProbe { results: Some(_) }) => Observation {
                status,
                state: JobState::Done,
                payload: Some(RawPayload::new(body)),
                message: None,
            },
            _ => Observation::new(status, JobState::Pending),
        };
    }

    match serde_json::from_str::<DetailsProbe>(&body) {
        Ok(details) => {
            let state = JobState::from_provider_status(&details.state.status);
            let observation = Observation::new(status, state);
            match details.state.message {
                Some(message) => observation.with_message(message),
                None => observation.with_message(details.state.status),
            }
        }
        Err(_) => Observation::new(status, JobState::Pending),
    }
}

fn truncate(message: &str) -> String {
    match message.char_indices().nth(MAX_MESSAGE_LEN) {
        Some((idx, _)) => format!("{}...", &message[..idx]),
        None => message.to_string(),
    }
}

// =============================================================================
// Probe types
// =============================================================================

/// First element of a JSON array; later elements are skipped
struct First<T>(Option<T>);

impl<'de, T: Deserialize<'de>> Deserialize<'de> for First<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FirstVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for FirstVisitor<T> {
            type Value = First<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an array")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let first = seq.next_element::<T>()?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(First(first))
            }
        }

        deserializer.deserialize_seq(FirstVisitor(PhantomData))
    }
}

#[derive(Deserialize)]
struct EntryProbe {
    #[serde(default)]
    results: Option<ResultsProbe>,
}

#[derive(Deserialize)]
struct ResultsProbe {
    #[allow(dead_code)]
    predictions: IgnoredAny,
}

#[derive(Deserialize)]
struct DetailsProbe {
    state: StateProbe,
}

#[derive(Deserialize)]
struct StateProbe {
    status: String,
    #[serde(default)]
    message: Option<String>,
}
