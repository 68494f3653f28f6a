//! Transport from the chat client to the relay.

use std::time::Duration;

use async_trait::async_trait;

use vetllm_core::types::RelayReply;

use crate::controller::PendingRequest;
use crate::error::FlowError;

/// Sends a pending request to the relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &PendingRequest) -> Result<RelayReply, FlowError>;
}

/// HTTP client posting `{ message, provider }` to `{relay_url}/{category}/{action}`.
#[derive(Debug, Clone)]
pub struct HttpRelayClient {
    client: reqwest::Client,
    relay_url: String,
}

impl HttpRelayClient {
    pub fn new(relay_url: &str, timeout: Option<Duration>) -> Result<Self, FlowError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FlowError::Transport(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            relay_url: relay_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn relay_url(&self) -> &str {
        &self.relay_url
    }
}

#[async_trait]
impl RelayTransport for HttpRelayClient {
    async fn send(&self, request: &PendingRequest) -> Result<RelayReply, FlowError> {
        let url = format!("{}{}", self.relay_url, request.path());
        tracing::debug!(url = %url, "Posting to relay");

        let response = self.client.post(&url).json(&request.body()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url = %url, status = %status, "Relay returned non-success status");
        }

        // Error statuses still carry a JSON `{ error }` body.
        let reply = response.json::<RelayReply>().await?;
        Ok(reply)
    }
}
