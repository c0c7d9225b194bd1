//! Event classification and decoding.
//!
//! Classification only looks at the top-level keys of the payload; the full
//! typed decode happens once the kind is known.

use runtrace_core::events::{ClassifiedEvent, EventKind, WorkflowJobEvent, WorkflowRunEvent};
use runtrace_core::{Error, Result};
use serde_json::value::RawValue;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Determine which event kind a payload carries without decoding it fully.
///
/// `workflow_job` is checked before `workflow_run`.
pub fn classify(payload: &[u8]) -> Result<EventKind> {
    let keys: HashMap<String, &RawValue> = serde_json::from_slice(payload)?;

    let kind = [EventKind::WorkflowJob, EventKind::WorkflowRun]
        .into_iter()
        .find(|kind| keys.contains_key(kind.payload_key()));

    match kind {
        Some(kind) => {
            debug!(kind = kind.payload_key(), "Classified webhook payload");
            Ok(kind)
        }
        None => {
            warn!(keys = keys.len(), "Unknown event type");
            Err(Error::UnrecognizedEventKind)
        }
    }
}

/// Strictly decode a payload already classified as `kind`.
pub fn decode(kind: EventKind, payload: &[u8]) -> Result<ClassifiedEvent> {
    let event = match kind {
        EventKind::WorkflowJob => {
            ClassifiedEvent::Job(serde_json::from_slice::<WorkflowJobEvent>(payload)?)
        }
        EventKind::WorkflowRun => {
            ClassifiedEvent::Run(serde_json::from_slice::<WorkflowRunEvent>(payload)?)
        }
    };
    Ok(event)
}

/// Classify then decode.
pub fn parse_event(payload: &[u8]) -> Result<ClassifiedEvent> {
    let kind = classify(payload)?;
    decode(kind, payload)
}
