//! Liveness and readiness endpoints.

use axum::{Json, extract::State};
use runtrace_webhook::SignaturePolicy;
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// How the receiver treats webhook signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureMode {
    /// No secret configured.
    Disabled,
    /// Signed deliveries are verified, unsigned ones let through.
    Verified,
    Required,
}

impl From<&SignaturePolicy> for SignatureMode {
    fn from(policy: &SignaturePolicy) -> Self {
        if policy.requires_signature() {
            SignatureMode::Required
        } else if policy.is_enabled() {
            SignatureMode::Verified
        } else {
            SignatureMode::Disabled
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub signatures: SignatureMode,
    pub max_body_bytes: usize,
}

pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    Json(ReadyResponse {
        ready: true,
        signatures: SignatureMode::from(state.processor.policy()),
        max_body_bytes: state.max_body_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_mode() {
        assert_eq!(
            SignatureMode::from(&SignaturePolicy::new("", true)),
            SignatureMode::Disabled
        );
        assert_eq!(
            SignatureMode::from(&SignaturePolicy::new("s3cret", false)),
            SignatureMode::Verified
        );
        assert_eq!(
            SignatureMode::from(&SignaturePolicy::new("s3cret", true)),
            SignatureMode::Required
        );
    }
}
