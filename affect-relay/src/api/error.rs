//! API Error Handling
//!
//! Unified error type and conversion for API responses.

use affect_client::PollError;
use affect_core::AggregationError;
use affect_core::dto::analysis::ErrorBody;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::service::analysis::AnalysisError;

/// API error type
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(String),
    NotFound(String),
    InternalError(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalError(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Poll(err) => err.into(),
            AnalysisError::Aggregation(err) => err.into(),
        }
    }
}

impl From<PollError> for ApiError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::InvalidRequest(msg) => {
                tracing::warn!("Rejected request: {}", msg);
                ApiError::BadRequest(msg)
            }
            PollError::Unauthorized => {
                tracing::warn!("Provider rejected the API key");
                ApiError::Unauthorized("Unauthorized: invalid provider API key".to_string())
            }
            PollError::JobNotFound(id) => {
                tracing::warn!("Job {} not found at provider", id);
                ApiError::NotFound(format!("Job {} not found or not ready", id))
            }
            PollError::Config(msg) => {
                tracing::error!("Provider client misconfigured: {}", msg);
                ApiError::InternalError("Provider client misconfigured".to_string())
            }
            PollError::Connection(msg) => {
                tracing::error!("Provider connection error: {}", msg);
                ApiError::InternalError("Failed to connect to provider".to_string())
            }
            PollError::Provider { status, message } => {
                tracing::error!("Provider error (status {}): {}", status, message);
                ApiError::InternalError("Failed to retrieve data from provider".to_string())
            }
            err @ (PollError::JobFailed { .. } | PollError::Timeout { .. }) => {
                tracing::error!("{}", err);
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

impl From<AggregationError> for ApiError {
    fn from(err: AggregationError) -> Self {
        match err {
            AggregationError::NoValidFrames => {
                tracing::warn!("{}", err);
                ApiError::BadRequest(err.to_string())
            }
            AggregationError::MalformedPayload(ref msg) => {
                tracing::error!("Malformed provider payload: {}", msg);
                ApiError::InternalError("Invalid data format".to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
