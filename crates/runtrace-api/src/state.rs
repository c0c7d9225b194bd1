//! Application state shared across handlers.

use crate::processor::WebhookProcessor;

/// Application state shared across all handlers.
pub struct AppState {
    pub processor: WebhookProcessor,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(processor: WebhookProcessor, max_body_bytes: usize) -> Self {
        Self {
            processor,
            max_body_bytes,
        }
    }
}
