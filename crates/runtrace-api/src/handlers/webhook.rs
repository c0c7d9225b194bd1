//! GitHub webhook delivery handler.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use runtrace_core::{Error, RejectionKind};
use runtrace_webhook::{SignatureScheme, WebhookRequest};
use std::sync::Arc;
use tracing::{info, warn};

use crate::state::AppState;

pub async fn receive(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, (StatusCode, String)> {
    let delivery = header_str(&headers, "x-github-delivery").unwrap_or_default();
    let event = header_str(&headers, "x-github-event").unwrap_or_default();

    let request = WebhookRequest {
        body: &body,
        signature_256: header_str(&headers, SignatureScheme::Sha256.header_name()),
        signature: header_str(&headers, SignatureScheme::Sha1.header_name()),
    };

    match state.processor.process(request).await {
        Ok(spans) => {
            info!(delivery, event, spans, "Delivery accepted");
            Ok(StatusCode::ACCEPTED)
        }
        Err(err) => {
            let status = status_for(&err);
            warn!(delivery, event, status = status.as_u16(), error = %err, "Delivery rejected");
            Err((status, public_message(&err)))
        }
    }
}

/// Response text for a rejected delivery. Server-side failures stay in the logs.
fn public_message(err: &Error) -> String {
    match err.rejection() {
        RejectionKind::Unauthenticated | RejectionKind::Malformed => err.to_string(),
        RejectionKind::Internal | RejectionKind::Downstream => {
            "Failed to process traces".to_string()
        }
    }
}

pub fn status_for(err: &Error) -> StatusCode {
    match err.rejection() {
        RejectionKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        RejectionKind::Malformed => StatusCode::BAD_REQUEST,
        RejectionKind::Internal | RejectionKind::Downstream => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&Error::Authentication("mismatch".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&Error::UnrecognizedEventKind), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&Error::IdentifierDerivation("zero".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&Error::DownstreamConsume("503".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_are_not_echoed() {
        let err = Error::DownstreamConsume("collector unavailable".into());
        assert_eq!(public_message(&err), "Failed to process traces");

        let err = Error::Authentication("X-Hub-Signature-256 does not match payload".into());
        assert!(public_message(&err).contains("does not match payload"));
    }
}
