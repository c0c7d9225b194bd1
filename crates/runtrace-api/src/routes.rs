//! Route definitions.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, webhook};
use crate::middleware::{request_id, require_hookshot};
use crate::state::AppState;

/// Create the receiver router with the webhook mounted at `path`.
pub fn create_router(state: Arc<AppState>, path: &str) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route(path, post(webhook::receive))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn(require_hookshot))
        .layer(middleware::from_fn(request_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
