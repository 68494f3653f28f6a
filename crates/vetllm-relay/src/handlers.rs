//! Route handler functions for all relay endpoints.
//!
//! Query handlers parse the `{ message, provider }` body leniently (an empty
//! body counts as `{}`), relay it through `QueryRelay`, and always answer
//! 200 with `{ response, matches }` once a message is present.

use std::io::ErrorKind;

use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use vetllm_core::types::{RelayRequest, RelayResponse};
use vetllm_core::{Category, VetError};

use crate::error::ApiError;
use crate::state::AppState;

/// Route used by `/chat` when no category is given.
const CHAT_FALLBACK: (Category, &str) = (Category::Clinical, "synonym");

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub api_base_url: String,
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse a query body. Empty bodies are treated as `{}`.
fn parse_request(body: &Bytes) -> Result<RelayRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(RelayRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Extract the required message, rejecting missing or empty values.
fn require_message(request: &RelayRequest) -> Result<&str, ApiError> {
    match request.text() {
        Some(message) if !message.is_empty() => Ok(message),
        _ => Err(ApiError::BadRequest("No message provided".to_string())),
    }
}

/// Action keywords are path segments on the backend: ASCII letters, digits
/// and underscores only.
fn require_action(action: &str) -> Result<&str, ApiError> {
    if !action.is_empty() && action.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(action)
    } else {
        tracing::warn!(action, "Rejected action keyword");
        Err(ApiError::BadRequest(format!("Invalid action: {}", action)))
    }
}

async fn relay_query(
    state: &AppState,
    category: Category,
    action: &str,
    body: &Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let action = require_action(action)?;
    let request = parse_request(body)?;
    let message = require_message(&request)?;
    tracing::info!(
        category = %category,
        action,
        provider = ?request.provider,
        query = message,
        "Received query"
    );

    let response = state
        .relay
        .process(message, request.provider.as_deref(), category, action)
        .await;
    Ok(Json(response))
}

// =============================================================================
// Handler functions
// =============================================================================

/// POST /clinical/{action}
pub async fn clinical_query(
    State(state): State<AppState>,
    Path(action): Path<String>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_query(&state, Category::Clinical, &action, &body).await
}

/// POST /disease/{action}
pub async fn disease_query(
    State(state): State<AppState>,
    Path(action): Path<String>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_query(&state, Category::Disease, &action, &body).await
}

/// POST /pharma/{action}
pub async fn pharma_query(
    State(state): State<AppState>,
    Path(action): Path<String>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    relay_query(&state, Category::Pharma, &action, &body).await
}

/// POST /chat - general fallback, routed to clinical/synonym.
pub async fn chat(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let (category, action) = CHAT_FALLBACK;
    relay_query(&state, category, action, &body).await
}

/// GET / - the static chat page from the public directory.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let page = state.public_dir.join("chat.html");
    match tokio::fs::read_to_string(&page).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!(path = %page.display(), "Chat page not found");
            Err(ApiError::NotFound("chat.html not found".to_string()))
        }
        Err(e) => {
            tracing::error!(path = %page.display(), error = %e, "Failed to read chat page");
            Err(VetError::from(e).into())
        }
    }
}

/// GET /health - health check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        api_base_url: state.config.api_base_url.clone(),
    })
}
