//! Operating-system backed span id source.

use rand::RngCore;
use rand::rngs::OsRng;
use runtrace_core::SpanId;
use runtrace_core::ports::RandomSource;

/// Draws step span ids from the OS CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn span_id(&self) -> SpanId {
        loop {
            let mut bytes = [0u8; 8];
            OsRng.fill_bytes(&mut bytes);
            let id = SpanId::from_bytes(bytes);
            // all-zero is the invalid span id
            if id.is_valid() {
                return id;
            }
        }
    }
}
