//! HTTP middleware for the receiver.

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;
use uuid::Uuid;

use crate::config::RESERVED_PATHS;

pub static REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

pub const HOOKSHOT_AGENT_PREFIX: &str = "GitHub-Hookshot";

/// Tag each request and its response with an `x-request-id`.
///
/// A well-formed id supplied by the caller is kept.
pub async fn request_id(mut request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID)
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(generate);

    request
        .headers_mut()
        .insert(REQUEST_ID.clone(), request_id.clone());

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID.clone(), request_id);

    response
}

fn generate() -> HeaderValue {
    // Hyphenated UUIDs are always valid header values.
    HeaderValue::from_str(&Uuid::new_v4().to_string())
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"))
}

/// Turn away requests not sent by GitHub's webhook agent, before routing.
///
/// `/health` and `/ready` are open to any caller.
pub async fn require_hookshot(request: Request<Body>, next: Next) -> Response {
    if RESERVED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !user_agent.starts_with(HOOKSHOT_AGENT_PREFIX) {
        warn!(user_agent, path = request.uri().path(), "Rejected non-GitHub user agent");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    next.run(request).await
}
