//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the trace-building core and
//! the adapters around it: where finished traces go, where step span ids
//! come from, and where diagnostics are reported.

use crate::events::EventKind;
use crate::ids::SpanId;
use crate::trace::Trace;
use crate::Result;
use async_trait::async_trait;

/// Downstream consumer of finished traces.
///
/// Called once per converted event. Errors are reported to the webhook
/// sender and never retried here; buffering and retry belong to the sink.
#[async_trait]
pub trait TraceSink: Send + Sync {
    /// Accept a finished trace.
    async fn accept(&self, trace: Trace) -> Result<()>;
}

/// Source of identifiers for spans with no stable business key.
pub trait RandomSource: Send + Sync {
    /// A fresh, valid (non-zero) span id.
    fn span_id(&self) -> SpanId;
}

/// Passive sink for structured diagnostics from the trace builder.
///
/// Implementations must not influence control flow.
pub trait Diagnostics: Send + Sync {
    fn record(&self, event: DiagnosticEvent<'_>);
}

/// Events reported while converting a webhook payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent<'a> {
    /// Conversion of an event started.
    Converting {
        kind: EventKind,
        run_id: i64,
        run_attempt: i64,
    },
    /// The event is not completed yet, so no spans were produced.
    NotCompleted { kind: EventKind, status: &'a str },
    /// A job carried no steps; its own timestamps were used instead.
    NoSteps { job: &'a str },
    /// A span was appended to the trace.
    SpanCreated {
        name: &'a str,
        span_id: SpanId,
        parent_span_id: Option<SpanId>,
    },
    /// An identifier could not be derived; the conversion is aborted.
    IdentifierFailed { what: &'static str, reason: String },
}

/// Discards every diagnostic.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDiagnostics;

impl Diagnostics for NoopDiagnostics {
    fn record(&self, _event: DiagnosticEvent<'_>) {}
}
