//! Webhook processing pipeline.

use crate::config::ReceiverConfig;
use runtrace_core::ports::TraceSink;
use runtrace_core::{Result, Trace};
use runtrace_trace::{OsRandom, TraceBuilder, TracingDiagnostics};
use runtrace_webhook::{SignaturePolicy, WebhookRequest, parse_event};
use std::sync::Arc;
use tracing::debug;

/// Authenticates, decodes and converts deliveries, then hands the resulting
/// trace to the sink.
#[derive(Clone)]
pub struct WebhookProcessor {
    policy: SignaturePolicy,
    builder: TraceBuilder,
    sink: Arc<dyn TraceSink>,
}

impl WebhookProcessor {
    pub fn new(policy: SignaturePolicy, builder: TraceBuilder, sink: Arc<dyn TraceSink>) -> Self {
        Self {
            policy,
            builder,
            sink,
        }
    }

    /// Processor with OS randomness and `tracing` diagnostics.
    pub fn from_config(config: &ReceiverConfig, sink: Arc<dyn TraceSink>) -> Self {
        let policy = SignaturePolicy::new(config.secret.clone(), config.require_signature);
        let builder = TraceBuilder::new(
            config.service_names.clone(),
            Arc::new(OsRandom),
            Arc::new(TracingDiagnostics),
        );
        Self::new(policy, builder, sink)
    }

    pub fn policy(&self) -> &SignaturePolicy {
        &self.policy
    }

    /// Authenticate and convert a delivery without emitting it.
    pub fn convert(&self, request: &WebhookRequest<'_>) -> Result<Trace> {
        let authenticity = self.policy.check(request)?;
        debug!(?authenticity, bytes = request.body.len(), "Delivery authenticated");

        let event = parse_event(request.body)?;
        self.builder.build(&event)
    }

    /// Convert a delivery and hand the trace to the sink.
    ///
    /// Returns the number of spans emitted.
    pub async fn process(&self, request: WebhookRequest<'_>) -> Result<usize> {
        let trace = self.convert(&request)?;
        let spans = trace.span_count();
        self.sink.accept(trace).await?;
        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use runtrace_core::Error;
    use runtrace_webhook::SignatureScheme;
    use std::sync::Mutex;

    const PAYLOAD: &str = r#"{
        "action": "completed",
        "workflow_job": {
            "id": 1, "run_id": 12345, "run_attempt": 1, "name": "build",
            "status": "completed", "conclusion": "success",
            "steps": [{"name": "checkout", "status": "completed", "conclusion": "success",
                       "started_at": "2024-01-01T00:00:00Z", "completed_at": "2024-01-01T00:00:05Z"}]
        },
        "repository": {"full_name": "octo/repo", "owner": {"login": "octo"}}
    }"#;

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<Trace>>);

    #[async_trait]
    impl TraceSink for RecordingSink {
        async fn accept(&self, trace: Trace) -> Result<()> {
            self.0.lock().unwrap().push(trace);
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl TraceSink for FailingSink {
        async fn accept(&self, _trace: Trace) -> Result<()> {
            Err(Error::DownstreamConsume("collector unavailable".into()))
        }
    }

    fn processor(secret: &str, sink: Arc<dyn TraceSink>) -> WebhookProcessor {
        let config = ReceiverConfig {
            secret: secret.into(),
            ..Default::default()
        };
        WebhookProcessor::from_config(&config, sink)
    }

    #[tokio::test]
    async fn test_process_emits_trace() {
        let sink = Arc::new(RecordingSink::default());
        let spans = processor("", sink.clone())
            .process(WebhookRequest::new(PAYLOAD.as_bytes()))
            .await
            .unwrap();

        assert_eq!(spans, 2);
        let traces = sink.0.lock().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].resource.get_str("service.name"), Some("octo-repo"));
    }

    #[tokio::test]
    async fn test_signed_delivery() {
        let sink = Arc::new(RecordingSink::default());
        let header = SignatureScheme::Sha256.sign("topsecret", PAYLOAD.as_bytes());
        let request = WebhookRequest::new(PAYLOAD.as_bytes()).with_signature_256(&header);

        let spans = processor("topsecret", sink).process(request).await.unwrap();
        assert_eq!(spans, 2);
    }

    #[tokio::test]
    async fn test_bad_signature_never_reaches_sink() {
        let sink = Arc::new(RecordingSink::default());
        let header = SignatureScheme::Sha256.sign("wrong", PAYLOAD.as_bytes());
        let request = WebhookRequest::new(PAYLOAD.as_bytes()).with_signature_256(&header);

        let err = processor("topsecret", sink.clone()).process(request).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(sink.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_propagates() {
        let err = processor("", Arc::new(FailingSink))
            .process(WebhookRequest::new(PAYLOAD.as_bytes()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DownstreamConsume(_)));
    }

    #[test]
    fn test_convert_unknown_kind() {
        let sink = Arc::new(RecordingSink::default());
        let err = processor("", sink)
            .convert(&WebhookRequest::new(br#"{"zen": "Keep it logically awesome."}"#))
            .unwrap_err();
        assert!(matches!(err, Error::UnrecognizedEventKind));
    }
}
