//! runtrace core
//!
//! Domain types, ports and error handling for runtrace.
//! This crate has minimal dependencies and defines the shared vocabulary
//! (webhook payloads, trace documents, identifiers) used by all other crates.

pub mod error;
pub mod events;
pub mod ids;
pub mod ports;
pub mod trace;

pub use error::{Error, RejectionKind, Result};
pub use events::{ClassifiedEvent, EventKind};
pub use ids::{SpanId, TraceId};
pub use trace::{AttributeValue, Resource, Span, SpanKind, Status, StatusCode, Trace};
