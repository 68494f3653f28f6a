//! Client for the external clinical/pharma REST backend.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use vetllm_core::types::{BackendReply, BackendRequest};
use vetllm_core::Category;

use crate::error::RelayError;

/// Seam between the relay and the backend it forwards to.
#[async_trait]
pub trait QueryBackend: Send + Sync {
    /// POST `request` to `/{category}/{action}` and decode the reply.
    async fn query(
        &self,
        category: Category,
        action: &str,
        request: &BackendRequest,
    ) -> Result<BackendReply, RelayError>;
}

/// `reqwest`-based backend client.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    /// Create a client for `base_url`, with an optional per-request timeout.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| RelayError::Client(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a category/action pair.
    pub fn endpoint_url(&self, category: Category, action: &str) -> String {
        format!("{}/{}/{}", self.base_url, category.path_segment(), action)
    }
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn query(
        &self,
        category: Category,
        action: &str,
        request: &BackendRequest,
    ) -> Result<BackendReply, RelayError> {
        let url = self.endpoint_url(category, action);
        tracing::debug!(url = %url, request = ?request, "Backend request");

        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            // The body is still relayed; the backend reports its own errors in it.
            tracing::warn!(url = %url, status = %status, "Backend returned non-success status");
        }

        let bytes = resp.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        tracing::debug!(url = %url, response = %body, "Backend response");

        Ok(match body {
            Value::Object(_) => serde_json::from_value(body)?,
            _ => BackendReply::default(),
        })
    }
}
