//! VetLLM relay - axum HTTP server that normalizes chat queries and
//! forwards them to the external clinical/pharma backend.
//!
//! Serves the static chat page, the category query routes
//! (`/clinical/{action}`, `/disease/{action}`, `/pharma/{action}`), the
//! `/chat` fallback and a health check.

pub mod backend;
pub mod error;
pub mod handlers;
pub mod normalizer;
pub mod relay;
pub mod routes;
pub mod state;

pub use backend::{HttpBackend, QueryBackend};
pub use error::{ApiError, RelayError};
pub use relay::QueryRelay;
pub use routes::{create_router, start_server};
pub use state::AppState;
