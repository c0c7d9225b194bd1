//! Identifier derivation.
//!
//! Run- and job-level ids are hashed from stable business keys so that
//! duplicate or out-of-order deliveries for the same run attempt land in the
//! same trace and reuse the same job span. Step ids have no stable key (a
//! step name can repeat across attempts) and are drawn from a
//! [`RandomSource`] instead, so redelivered job events produce new step ids.

use runtrace_core::ports::RandomSource;
use runtrace_core::{Error, Result, SpanId, TraceId};
use sha2::{Digest, Sha256};
use std::ops::Range;
use std::sync::Arc;

/// Hex window of the digest used for span ids.
const SPAN_ID_HEX: Range<usize> = 16..32;
/// Hex window of the digest used for trace ids.
const TRACE_ID_HEX: Range<usize> = 0..32;

/// Trace id shared by every event of one run attempt.
pub fn trace_id(run_id: i64, run_attempt: i64) -> Result<TraceId> {
    let digest = sha256_hex(&format!("{run_id}{run_attempt}t"));
    let mut bytes = [0u8; 16];
    decode_window(&digest, TRACE_ID_HEX, &mut bytes, "trace id")?;
    valid(TraceId::from_bytes(bytes), "trace id", TraceId::is_valid)
}

/// Span id of the run-level root; job spans use it as their parent.
pub fn run_parent_span_id(run_id: i64, run_attempt: i64) -> Result<SpanId> {
    span_id_from(&format!("{run_id}{run_attempt}s"), "run span id")
}

/// Span id of a job within a run attempt.
pub fn job_span_id(run_id: i64, run_attempt: i64, job_name: &str) -> Result<SpanId> {
    span_id_from(&format!("{run_id}{run_attempt}{job_name}"), "job span id")
}

fn span_id_from(input: &str, what: &'static str) -> Result<SpanId> {
    let digest = sha256_hex(input);
    let mut bytes = [0u8; 8];
    decode_window(&digest, SPAN_ID_HEX, &mut bytes, what)?;
    valid(SpanId::from_bytes(bytes), what, SpanId::is_valid)
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

fn decode_window(digest: &str, window: Range<usize>, out: &mut [u8], what: &str) -> Result<()> {
    let slice = digest
        .get(window)
        .ok_or_else(|| Error::IdentifierDerivation(format!("{what}: digest too short")))?;
    hex::decode_to_slice(slice, out)
        .map_err(|e| Error::IdentifierDerivation(format!("{what}: {e}")))
}

fn valid<T>(id: T, what: &str, is_valid: fn(&T) -> bool) -> Result<T> {
    if is_valid(&id) {
        Ok(id)
    } else {
        Err(Error::IdentifierDerivation(format!("{what}: derived the invalid all-zero id")))
    }
}

/// Bundles the deterministic derivations with the random step-id source.
#[derive(Clone)]
pub struct IdDeriver {
    random: Arc<dyn RandomSource>,
}

impl IdDeriver {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn trace_id(&self, run_id: i64, run_attempt: i64) -> Result<TraceId> {
        trace_id(run_id, run_attempt)
    }

    pub fn run_parent_span_id(&self, run_id: i64, run_attempt: i64) -> Result<SpanId> {
        run_parent_span_id(run_id, run_attempt)
    }

    pub fn job_span_id(&self, run_id: i64, run_attempt: i64, job_name: &str) -> Result<SpanId> {
        job_span_id(run_id, run_attempt, job_name)
    }

    pub fn step_span_id(&self) -> SpanId {
        self.random.span_id()
    }
}
