//! GitHub webhook handling for runtrace.
//!
//! Authenticates raw deliveries against the shared webhook secret and turns
//! the JSON body into a [`ClassifiedEvent`](runtrace_core::ClassifiedEvent).

pub mod decode;
pub mod signature;

pub use decode::{classify, decode, parse_event};
pub use signature::{Authenticity, SignaturePolicy, SignatureScheme, WebhookRequest};
