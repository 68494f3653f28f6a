//! Router setup with all relay routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, the query
//! routes and static file serving from the public directory.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use vetllm_core::error::VetError;

use crate::handlers;
use crate::state::AppState;

/// Origins allowed to call the relay from a browser.
///
/// Uses `server.allowedOrigins` when set, else localhost on the serving port.
fn allowed_origins(state: &AppState) -> Vec<HeaderValue> {
    let server = &state.config.server;
    let origins: Vec<String> = if server.allowed_origins.is_empty() {
        vec![
            format!("http://127.0.0.1:{}", server.port),
            format!("http://localhost:{}", server.port),
        ]
    } else {
        server.allowed_origins.clone()
    };

    origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins(&state)))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let static_files = ServeDir::new(&state.public_dir);

    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/chat", post(handlers::chat))
        .route("/clinical/{action}", post(handlers::clinical_query))
        .route("/disease/{action}", post(handlers::disease_query))
        .route("/pharma/{action}", post(handlers::pharma_query))
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(256 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured host and port.
pub async fn start_server(state: AppState) -> Result<(), VetError> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| VetError::Http(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!(addr = %addr, "Server is running");

    axum::serve(listener, router)
        .await
        .map_err(|e| VetError::Http(format!("Server error: {}", e)))?;

    Ok(())
}
