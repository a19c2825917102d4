//! Job poller
//!
//! Waits for a provider batch job to finish. Each attempt fetches the job's
//! predictions once; a "not ready" answer sleeps and tries again until the
//! attempt budget is spent. Every other outcome ends the poll immediately.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, info, warn};

use affect_core::domain::job::JobState;

use crate::classify::{Observation, classify};
use crate::error::{PollError, Result};
use crate::{ProviderResponse, RawPayload};

/// Upper bound for the transient-error backoff
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Source of provider responses for a job
///
/// Implemented by [`crate::ProviderClient`] over HTTP; tests substitute
/// scripted sources.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Fetches the current predictions response for `job_id`
    ///
    /// Returns `Err` only for transport failures.
    async fn fetch(&self, job_id: &str) -> Result<ProviderResponse>;
}

/// Immutable poll tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    max_attempts: u32,
    per_attempt_timeout: Duration,
    retry_interval: Duration,
    initial_delay: Duration,
    retry_transient: bool,
}

impl PollSettings {
    /// Creates settings, rejecting a zero attempt budget or a zero timeout
    pub fn new(
        max_attempts: u32,
        per_attempt_timeout: Duration,
        retry_interval: Duration,
    ) -> Result<Self> {
        if max_attempts == 0 {
            return Err(PollError::InvalidRequest(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if per_attempt_timeout.is_zero() {
            return Err(PollError::InvalidRequest(
                "per_attempt_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            max_attempts,
            per_attempt_timeout,
            retry_interval,
            initial_delay: Duration::ZERO,
            retry_transient: false,
        })
    }

    /// Waits this long before the first attempt
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Retries connection and 5xx failures with exponential backoff
    pub fn with_retry_transient(mut self, enabled: bool) -> Self {
        self.retry_transient = enabled;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn per_attempt_timeout(&self) -> Duration {
        self.per_attempt_timeout
    }

    pub fn retry_interval(&self) -> Duration {
        self.retry_interval
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn retry_transient(&self) -> bool {
        self.retry_transient
    }

    /// Worst-case wall time of one poll, excluding the initial delay
    ///
    /// Saturates at `Duration::MAX` for out-of-range settings.
    pub fn worst_case(&self) -> Duration {
        self.per_attempt_timeout
            .saturating_add(self.retry_interval)
            .saturating_mul(self.max_attempts)
    }
}

/// Outcome of a single attempt
enum Attempt {
    Ready(RawPayload),
    NotReady(JobState),
    Failed(PollError),
}

/// Polls one provider for job completion
#[derive(Clone)]
pub struct JobPoller {
    source: Arc<dyn PredictionSource>,
    settings: PollSettings,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(source: Arc<dyn PredictionSource>, settings: PollSettings) -> Self {
        Self { source, settings }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Polls until the job is done, fails, or the attempt budget runs out
    pub async fn poll(&self, job_id: &str) -> Result<RawPayload> {
        let job_id = job_id.trim();
        if job_id.is_empty() {
            return Err(PollError::InvalidRequest("job_id cannot be empty".to_string()));
        }

        let max_attempts = self.settings.max_attempts;

        if !self.settings.initial_delay.is_zero() {
            debug!(job_id, delay = ?self.settings.initial_delay, "Waiting before first poll");
            time::sleep(self.settings.initial_delay).await;
        }

        let mut backoff = self.settings.retry_interval.min(MAX_BACKOFF);

        for attempt in 1..=max_attempts {
            debug!(job_id, attempt, max_attempts, "Polling provider");

            match self.attempt(job_id).await {
                Attempt::Ready(payload) => {
                    info!(
                        job_id,
                        attempt,
                        bytes = payload.len(),
                        "Predictions ready"
                    );
                    return Ok(payload);
                }
                Attempt::NotReady(state) => {
                    debug!(job_id, attempt, ?state, "Job not ready yet");
                    if attempt < max_attempts {
                        time::sleep(self.settings.retry_interval).await;
                    }
                }
                Attempt::Failed(err)
                    if self.settings.retry_transient
                        && err.is_transient()
                        && attempt < max_attempts =>
                {
                    warn!(
                        job_id,
                        attempt,
                        max_attempts,
                        "Transient provider failure, retrying in {:?}: {}",
                        backoff,
                        err
                    );
                    time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2).min(MAX_BACKOFF);
                }
                Attempt::Failed(err) => {
                    warn!(job_id, attempt, "Poll failed: {}", err);
                    return Err(err);
                }
            }
        }

        warn!(job_id, max_attempts, "Job not ready, giving up");
        Err(PollError::Timeout {
            attempts: max_attempts,
        })
    }

    async fn attempt(&self, job_id: &str) -> Attempt {
        let timeout = self.settings.per_attempt_timeout;
        match time::timeout(timeout, self.source.fetch(job_id)).await {
            Ok(Ok(response)) => resolve(job_id, classify(response)),
            Ok(Err(err)) => Attempt::Failed(err),
            Err(_) => Attempt::Failed(PollError::Connection(format!(
                "no response within {:?}",
                timeout
            ))),
        }
    }
}

fn resolve(job_id: &str, observation: Observation) -> Attempt {
    let Observation {
        status,
        state,
        payload,
        message,
    } = observation;

    match state {
        JobState::Done => match payload {
            Some(payload) => Attempt::Ready(payload),
            None => Attempt::NotReady(state),
        },
        JobState::Pending | JobState::Running => Attempt::NotReady(state),
        JobState::NotFound => Attempt::Failed(PollError::JobNotFound(job_id.to_string())),
        JobState::Unauthorized => Attempt::Failed(PollError::Unauthorized),
        JobState::Failed if status >= 500 => Attempt::Failed(PollError::provider(
            status,
            message.unwrap_or_else(|| "provider error".to_string()),
        )),
        JobState::Failed => Attempt::Failed(PollError::JobFailed {
            job_id: job_id.to_string(),
            message: message.unwrap_or_else(|| "job failed".to_string()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    const DONE: &str = r#"[{"results": {"predictions": []}}]"#;
    const RUNNING: &str = r#"{"state": {"status": "IN_PROGRESS"}}"#;

    /// Replays queued responses, then keeps answering "in progress"
    struct Scripted {
        responses: Mutex<VecDeque<Result<ProviderResponse>>>,
        calls: AtomicU32,
    }

    impl Scripted {
        fn new(responses: Vec<Result<ProviderResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PredictionSource for Scripted {
        async fn fetch(&self, _job_id: &str) -> Result<ProviderResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ProviderResponse::new(200, RUNNING)))
        }
    }

    /// Never answers within any sensible timeout
    struct Hanging;

    #[async_trait]
    impl PredictionSource for Hanging {
        async fn fetch(&self, _job_id: &str) -> Result<ProviderResponse> {
            time::sleep(Duration::from_secs(60)).await;
            Ok(ProviderResponse::new(200, DONE))
        }
    }

    fn settings(max_attempts: u32) -> PollSettings {
        PollSettings::new(max_attempts, Duration::from_secs(5), Duration::ZERO).unwrap()
    }

    fn ok(status: u16, body: &str) -> Result<ProviderResponse> {
        Ok(ProviderResponse::new(status, body))
    }

    #[test]
    fn test_settings_validation() {
        assert!(PollSettings::new(0, Duration::from_secs(1), Duration::ZERO).is_err());
        assert!(PollSettings::new(1, Duration::ZERO, Duration::ZERO).is_err());

        let s = PollSettings::new(3, Duration::from_secs(2), Duration::from_secs(1))
            .unwrap()
            .with_initial_delay(Duration::from_secs(15))
            .with_retry_transient(true);
        assert_eq!(s.max_attempts(), 3);
        assert_eq!(s.initial_delay(), Duration::from_secs(15));
        assert!(s.retry_transient());
        assert_eq!(s.worst_case(), Duration::from_secs(9));
    }

    #[test]
    fn test_worst_case_saturates() {
        let s = PollSettings::new(u32::MAX, Duration::MAX, Duration::MAX).unwrap();
        assert_eq!(s.worst_case(), Duration::MAX);
    }

    #[tokio::test]
    async fn test_ready_on_first_attempt() {
        let source = Scripted::new(vec![ok(200, DONE)]);
        let poller = JobPoller::new(source.clone(), settings(3));

        let payload = poller.poll("job-1").await.unwrap();
        assert_eq!(payload.as_str(), DONE);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_ready_after_pending_attempts() {
        let source = Scripted::new(vec![
            ok(200, r#"{"state": {"status": "QUEUED"}}"#),
            ok(400, "Job is in progress"),
            ok(200, "[]"),
            ok(200, DONE),
        ]);
        let poller = JobPoller::new(source.clone(), settings(5));

        assert!(poller.poll("job-1").await.is_ok());
        assert_eq!(source.calls(), 4);
    }

    #[tokio::test]
    async fn test_never_ready_times_out_after_budget() {
        for max_attempts in [1, 2, 5] {
            let source = Scripted::new(vec![]);
            let poller = JobPoller::new(source.clone(), settings(max_attempts));

            let err = poller.poll("job-1").await.unwrap_err();
            assert!(matches!(err, PollError::Timeout { attempts } if attempts == max_attempts));
            assert_eq!(source.calls(), max_attempts);
        }
    }

    /// Polls once against a single scripted response, expecting a terminal error
    async fn poll_once(response: Result<ProviderResponse>) -> PollError {
        let source = Scripted::new(vec![response]);
        let poller = JobPoller::new(source.clone(), settings(5));

        let err = poller.poll("job-1").await.unwrap_err();
        assert_eq!(source.calls(), 1);
        err
    }

    #[tokio::test]
    async fn test_terminal_statuses_stop_immediately() {
        assert!(matches!(
            poll_once(ok(404, "")).await,
            PollError::JobNotFound(id) if id == "job-1"
        ));
        assert!(matches!(
            poll_once(ok(401, "")).await,
            PollError::Unauthorized
        ));
        assert!(matches!(
            poll_once(ok(502, "bad gateway")).await,
            PollError::Provider { status: 502, message } if message == "bad gateway"
        ));
        assert!(matches!(
            poll_once(ok(200, r#"{"state": {"status": "FAILED", "message": "corrupt file"}}"#)).await,
            PollError::JobFailed { message, .. } if message == "corrupt file"
        ));
        assert!(matches!(
            poll_once(Err(PollError::Connection("refused".into()))).await,
            PollError::Connection(_)
        ));
    }

    #[tokio::test]
    async fn test_attempt_timeout_is_a_connection_error() {
        let s = PollSettings::new(3, Duration::from_millis(20), Duration::ZERO).unwrap();
        let poller = JobPoller::new(Arc::new(Hanging), s);

        let err = poller.poll("job-1").await.unwrap_err();
        assert!(matches!(err, PollError::Connection(_)));
    }

    #[tokio::test]
    async fn test_transient_retry_when_enabled() {
        let source = Scripted::new(vec![
            Err(PollError::Connection("reset".into())),
            ok(503, "overloaded"),
            ok(200, DONE),
        ]);
        let poller = JobPoller::new(source.clone(), settings(5).with_retry_transient(true));

        assert!(poller.poll("job-1").await.is_ok());
        assert_eq!(source.calls(), 3);
    }

    #[tokio::test]
    async fn test_transient_retry_returns_last_error_when_budget_spent() {
        let source = Scripted::new(vec![ok(500, "a"), ok(500, "b")]);
        let poller = JobPoller::new(source.clone(), settings(2).with_retry_transient(true));

        let err = poller.poll("job-1").await.unwrap_err();
        assert!(matches!(err, PollError::Provider { message, .. } if message == "b"));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_transient_retry_does_not_cover_terminal_errors() {
        let source = Scripted::new(vec![ok(401, "")]);
        let poller = JobPoller::new(source.clone(), settings(5).with_retry_transient(true));

        assert!(matches!(
            poller.poll("job-1").await,
            Err(PollError::Unauthorized)
        ));
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_blank_job_id_is_rejected_without_fetching() {
        let source = Scripted::new(vec![]);
        let poller = JobPoller::new(source.clone(), settings(3));

        assert!(matches!(
            poller.poll("  ").await,
            Err(PollError::InvalidRequest(_))
        ));
        assert_eq!(source.calls(), 0);
    }

    // Timing tests run on a paused clock; sleeps advance virtual time only.

    fn interval_settings(max_attempts: u32, retry_interval: Duration) -> PollSettings {
        PollSettings::new(max_attempts, Duration::from_secs(5), retry_interval).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_without_sleeping() {
        let source = Scripted::new(vec![ok(200, DONE)]);
        let poller = JobPoller::new(source, interval_settings(3, Duration::from_secs(5)));

        let start = time::Instant::now();
        poller.poll("job-1").await.unwrap();
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_between_attempts_only() {
        let source = Scripted::new(vec![ok(200, RUNNING), ok(200, DONE)]);
        let poller = JobPoller::new(source, interval_settings(3, Duration::from_secs(5)));

        let start = time::Instant::now();
        poller.poll("job-1").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_sleep_after_final_attempt() {
        let source = Scripted::new(vec![]);
        let poller = JobPoller::new(source.clone(), interval_settings(3, Duration::from_secs(5)));

        let start = time::Instant::now();
        let err = poller.poll("job-1").await.unwrap_err();
        assert!(matches!(err, PollError::Timeout { attempts: 3 }));
        assert_eq!(source.calls(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_delay_precedes_first_attempt() {
        let source = Scripted::new(vec![ok(200, DONE)]);
        let settings = interval_settings(3, Duration::from_secs(5))
            .with_initial_delay(Duration::from_secs(15));
        let poller = JobPoller::new(source, settings);

        let start = time::Instant::now();
        poller.poll("job-1").await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_backoff_doubles() {
        let source = Scripted::new(vec![
            ok(503, "a"),
            ok(503, "b"),
            ok(503, "c"),
            ok(200, DONE),
        ]);
        let settings = interval_settings(5, Duration::from_secs(4)).with_retry_transient(true);
        let poller = JobPoller::new(source, settings);

        let start = time::Instant::now();
        poller.poll("job-1").await.unwrap();
        // 4s + 8s + 16s
        assert_eq!(start.elapsed(), Duration::from_secs(28));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_backoff_is_capped() {
        let source = Scripted::new(vec![ok(503, "a"), ok(503, "b"), ok(200, DONE)]);
        let settings = interval_settings(5, Duration::from_secs(120)).with_retry_transient(true);
        let poller = JobPoller::new(source, settings);

        let start = time::Instant::now();
        poller.poll("job-1").await.unwrap();
        assert_eq!(start.elapsed(), MAX_BACKOFF * 2);
    }
}
