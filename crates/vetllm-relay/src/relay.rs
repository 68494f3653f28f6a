//! Query relay: normalize, forward, fold failures into the response payload.

use std::sync::Arc;

use vetllm_core::types::{BackendRequest, RelayResponse};
use vetllm_core::{Catalog, Category};

use crate::backend::QueryBackend;
use crate::normalizer::normalize_query;

/// Forwards chat queries to the backend.
///
/// Holds only immutable data; each call is independent.
pub struct QueryRelay {
    catalog: Arc<Catalog>,
    backend: Arc<dyn QueryBackend>,
    default_provider: String,
}

impl QueryRelay {
    pub fn new(
        catalog: Arc<Catalog>,
        backend: Arc<dyn QueryBackend>,
        default_provider: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            backend,
            default_provider: default_provider.into(),
        }
    }

    /// Relay one query to `/{category}/{action}` on the backend.
    ///
    /// Never fails: backend errors come back as `"Error: <message>"` with
    /// empty matches.
    pub async fn process(
        &self,
        message: &str,
        provider: Option<&str>,
        category: Category,
        action: &str,
    ) -> RelayResponse {
        let query = normalize_query(&self.catalog, message);
        let request = BackendRequest {
            query: query.into_owned(),
            endpoint: action.to_string(),
            provider: provider.unwrap_or(self.default_provider.as_str()).to_string(),
        };
        tracing::debug!(path = %format!("/{}/{}", category, action), "Using endpoint path");

        match self.backend.query(category, action, &request).await {
            Ok(reply) => reply.into_relay_response(),
            Err(e) => {
                tracing::error!(error = %e, category = %category, action, "Error during backend call");
                RelayResponse::error(e)
            }
        }
    }
}
