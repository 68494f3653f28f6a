//! Application state shared across all route handlers.
//!
//! Everything here is immutable after startup; handlers only read it.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use vetllm_core::{Catalog, VetConfig};

use crate::backend::{HttpBackend, QueryBackend};
use crate::error::RelayError;
use crate::relay::QueryRelay;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<VetConfig>,
    /// Normalize-and-forward pipeline.
    pub relay: Arc<QueryRelay>,
    /// Directory holding `chat.html` and static assets.
    pub public_dir: PathBuf,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Build state with an explicit backend.
    pub fn new(config: VetConfig, catalog: Arc<Catalog>, backend: Arc<dyn QueryBackend>) -> Self {
        let relay = QueryRelay::new(catalog, backend, config.default_provider.clone());
        Self {
            public_dir: PathBuf::from(&config.server.public_dir),
            config: Arc::new(config),
            relay: Arc::new(relay),
            start_time: Instant::now(),
        }
    }

    /// Build state talking to `config.api_base_url` over HTTP.
    pub fn from_config(config: VetConfig, catalog: Arc<Catalog>) -> Result<Self, RelayError> {
        let backend = HttpBackend::new(&config.api_base_url, config.request_timeout())?;
        Ok(Self::new(config, catalog, Arc::new(backend)))
    }
}
