//! Analysis Service
//!
//! Polls the provider for a job, keeps a copy of the raw payload, and reduces
//! the payload into an [`AnalysisReport`].

use affect_client::PollError;
use affect_core::domain::report::AnalysisReport;
use affect_core::frames::stream_frames_from_str;
use affect_core::{Aggregate, AggregationError};
use thiserror::Error;

use crate::state::AppState;

/// Service error type
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Poll(#[from] PollError),

    #[error(transparent)]
    Aggregation(#[from] AggregationError),
}

/// Poll, persist and score one job
pub async fn analyze_job(state: &AppState, job_id: &str) -> Result<AnalysisReport, AnalysisError> {
    let payload = state.poller.poll(job_id).await?;

    if let Err(err) = state.cache.store(&payload).await {
        tracing::warn!(
            path = %state.cache.path().display(),
            "Failed to persist raw payload: {}",
            err
        );
    }

    let mut aggregate = Aggregate::new(state.groups.as_ref().clone());
    stream_frames_from_str(payload.as_str(), &mut aggregate)?;

    let frames = aggregate.frame_count();
    let report = aggregate.finish()?;

    tracing::info!(
        job_id,
        frames,
        top_emotion = %report.top_emotion,
        "Analysis complete"
    );

    Ok(report)
}


#[cfg(test)]
mod tests {
    use super::testing::{CALM_THEN_NERVOUS, state_with};
    use super::*;
    use affect_client::ProviderResponse;
    use affect_core::domain::report::Level;

    #[tokio::test]
    async fn test_analyze_job_scores_and_caches() {
        let (state, cache) = state_with(vec![
            Ok(ProviderResponse::new(400, "Job is in progress")),
            Ok(ProviderResponse::new(200, CALM_THEN_NERVOUS)),
        ]);

        let report = analyze_job(&state, "job-1").await.unwrap();
        assert_eq!(report.confidence_score, 0.4);
        assert_eq!(report.nervousness_score, 0.45);
        assert_eq!(report.engagement_score, 1.0);
        assert_eq!(report.engagement_level, Level::High);
        assert_eq!(report.top_emotion, "calm");

        assert_eq!(cache.load().await.unwrap().as_deref(), Some(CALM_THEN_NERVOUS));
    }

    #[tokio::test]
    async fn test_poll_errors_pass_through() {
        let (state, cache) = state_with(vec![Ok(ProviderResponse::new(404, ""))]);

        let err = analyze_job(&state, "job-1").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Poll(PollError::JobNotFound(_))));
        assert_eq!(cache.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_no_frames_is_reported() {
        let body = r#"[{"results": {"predictions": [{"models": {"face": {"grouped_predictions": [
            {"predictions": [{"emotions": []}]}
        ]}}}]}}]"#;
        let (state, cache) = state_with(vec![Ok(ProviderResponse::new(200, body))]);

        let err = analyze_job(&state, "job-1").await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Aggregation(AggregationError::NoValidFrames)
        ));
        // The raw payload is still kept for inspection
        assert!(cache.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_malformed_payload_is_reported() {
        let body = r#"[{"results": {"predictions": [{"models": {"prosody": {}}}]}}]"#;
        let (state, _cache) = state_with(vec![Ok(ProviderResponse::new(200, body))]);

        let err = analyze_job(&state, "job-1").await.unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Aggregation(AggregationError::MalformedPayload(_))
        ));
    }
}
