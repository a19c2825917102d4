//! Analysis API Handlers
//!
//! HTTP endpoints for scoring a provider job and downloading its raw payload.

use affect_core::domain::report::AnalysisReport;
use affect_core::dto::analysis::AnalyzeRequest;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::service::analysis_service;
use crate::state::AppState;

/// GET|POST /analyze
/// Poll a provider job and return its summary scores
///
/// The job id is read from the `job_id` query parameter, falling back to a
/// JSON body of the form `{"job_id": "..."}`.
pub async fn analyze(
    State(state): State<AppState>,
    query: Result<Query<AnalyzeRequest>, QueryRejection>,
    body: Bytes,
) -> ApiResult<Json<AnalysisReport>> {
    let Query(query) = query
        .map_err(|e| ApiError::BadRequest(format!("Invalid query string: {}", e.body_text())))?;
    let job_id = resolve_job_id(&query, &body)?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("analyze", %request_id, %job_id);

    let report = async {
        tracing::info!("Received analysis request");
        analysis_service::analyze_job(&state, &job_id).await
    }
    .instrument(span)
    .await?;

    Ok(Json(report))
}

/// GET /analyze/raw
/// Download the most recent raw provider payload
pub async fn download_raw(State(state): State<AppState>) -> ApiResult<Response> {
    let body = state.cache.load().await.map_err(|e| {
        tracing::error!("Failed to read cached payload: {}", e);
        ApiError::InternalError("Failed to read cached results".to_string())
    })?;

    let Some(body) = body else {
        return Err(ApiError::NotFound("No results available yet".to_string()));
    };

    let disposition = format!("attachment; filename=\"{}\"", state.cache.file_name());

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

fn resolve_job_id(query: &AnalyzeRequest, body: &[u8]) -> ApiResult<String> {
    if let Some(id) = query.job_id() {
        return Ok(id.to_string());
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest("Job ID is required".to_string()));
    }

    let request: AnalyzeRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {}", e)))?;

    request
        .job_id()
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("Job ID is required".to_string()))
}
