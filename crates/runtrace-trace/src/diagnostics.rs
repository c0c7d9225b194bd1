//! Diagnostics adapter that forwards builder events to `tracing`.

use runtrace_core::ports::{DiagnosticEvent, Diagnostics};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: DiagnosticEvent<'_>) {
        match event {
            DiagnosticEvent::Converting {
                kind,
                run_id,
                run_attempt,
            } => {
                info!(kind = kind.payload_key(), run_id, run_attempt, "Converting event to trace");
            }
            DiagnosticEvent::NotCompleted { kind, status } => {
                debug!(kind = kind.payload_key(), status, "Event not completed, no spans emitted");
            }
            DiagnosticEvent::NoSteps { job } => {
                warn!(job, "No steps found, defaulting to job times");
            }
            DiagnosticEvent::SpanCreated {
                name,
                span_id,
                parent_span_id,
            } => {
                debug!(
                    span_name = name,
                    span_id = %span_id,
                    parent_span_id = ?parent_span_id.map(|id| id.to_hex()),
                    "Created span"
                );
            }
            DiagnosticEvent::IdentifierFailed { what, reason } => {
                error!(what, reason = %reason, "Failed to derive identifier");
            }
        }
    }
}
