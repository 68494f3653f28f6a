//! Relay error types.
//!
//! `ApiError` maps request-level failures to HTTP status codes with a
//! `{ "error": "..." }` body. `RelayError` covers backend failures, which
//! never become HTTP errors: the relay folds them into an `"Error: ..."`
//! response payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use vetllm_core::types::ErrorResponse;

/// API error type that maps to HTTP status codes and JSON responses.
#[derive(Debug)]
pub enum ApiError {
    /// 400 Bad Request - missing or invalid request fields.
    BadRequest(String),
    /// 404 Not Found - static page missing.
    NotFound(String),
    /// 500 Internal Server Error - unexpected server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<vetllm_core::VetError> for ApiError {
    fn from(err: vetllm_core::VetError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Failure talking to the external backend.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid JSON from backend: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<RelayError> for vetllm_core::VetError {
    fn from(err: RelayError) -> Self {
        vetllm_core::VetError::Backend(err.to_string())
    }
}
