//! Trace assembly for runtrace.
//!
//! Turns decoded GitHub Actions events into trace documents with
//! deterministic identifiers, encodes them as OTLP/JSON for export, and
//! sets up the receiver's own logging and OpenTelemetry pipeline.

pub mod builder;
pub mod diagnostics;
pub mod ids;
pub mod otlp;
pub mod random;
pub mod service_name;
pub mod sink;
pub mod telemetry;

pub use builder::{TraceBuilder, aggregate_step_status};
pub use diagnostics::TracingDiagnostics;
pub use ids::IdDeriver;
pub use otlp::ExportTraceServiceRequest;
pub use random::OsRandom;
pub use service_name::ServiceNameConfig;
pub use sink::{LogSink, OtlpHttpSink, OtlpSinkConfig, SinkConfig, SinkError, create_sink};
pub use telemetry::{LogFormat, TelemetryConfig, TelemetryError, init_telemetry, shutdown_telemetry};
