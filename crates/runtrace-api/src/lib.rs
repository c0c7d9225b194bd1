//! HTTP webhook receiver for runtrace.
//!
//! Accepts GitHub `workflow_job` / `workflow_run` deliveries, verifies and
//! converts them into traces, and hands each trace to the configured sink.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod processor;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ReceiverConfig;
pub use processor::WebhookProcessor;
pub use routes::create_router;
pub use server::{ServerError, serve, serve_with_shutdown, shutdown_signal};
pub use state::AppState;
