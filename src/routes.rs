//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET  /health`   - Health check: database and cache
//! - `/v1/books*`     - Book REST API
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
///
/// Trailing slashes are trimmed before routing, so `/v1/books/` and
/// `/v1/books` reach the same handler.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(service_router(state))
}

/// Routes and tracing without path normalization.
pub fn service_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/v1", api::routes::book_routes())
        .with_state(state)
        .layer(tracing::layer())
}
