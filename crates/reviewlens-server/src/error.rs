//! API error types.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use reviewlens_core::AnalysisError;

/// API errors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Analysis rejected the request or could not complete it.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Request body is not valid JSON of the expected shape.
    #[error("invalid request body: {}", .0.body_text())]
    InvalidJson(#[from] JsonRejection),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Analysis(e) => (status_for(e), e.code()),
            ApiError::InvalidJson(rejection) => (rejection.status(), "invalid_input"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

fn status_for(error: &AnalysisError) -> StatusCode {
    match error {
        AnalysisError::InvalidInput(_)
        | AnalysisError::EmptyBatch
        | AnalysisError::BatchTooLarge { .. } => StatusCode::BAD_REQUEST,
        AnalysisError::ScoringUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, axum::Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
