//! Listener setup and graceful shutdown.

use crate::config::ReceiverConfig;
use crate::processor::WebhookProcessor;
use crate::routes::create_router;
use crate::state::AppState;
use runtrace_core::ports::TraceSink;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] runtrace_core::Error),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Bind the configured endpoint and serve until ctrl-c or SIGTERM.
pub async fn serve(config: &ReceiverConfig, sink: Arc<dyn TraceSink>) -> Result<(), ServerError> {
    config.validate()?;

    let listener = TcpListener::bind(&config.endpoint)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.endpoint.clone(),
            source,
        })?;

    serve_with_shutdown(listener, config, sink, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` resolves.
pub async fn serve_with_shutdown(
    listener: TcpListener,
    config: &ReceiverConfig,
    sink: Arc<dyn TraceSink>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    let processor = WebhookProcessor::from_config(config, sink);
    let state = Arc::new(AppState::new(processor, config.max_body_bytes));
    let app = create_router(state, &config.path);

    info!(
        addr = %listener.local_addr()?,
        path = %config.path,
        signatures = !config.secret.is_empty(),
        "Receiver listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Receiver stopped");
    Ok(())
}

/// Resolves on ctrl-c or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    match wait_for_signal().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!(error = %e, "Failed to listen for shutdown signals");
            std::future::pending::<()>().await;
        }
    }
}

async fn wait_for_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result,
            _ = sigterm.recv() => Ok(()),
        }
    }
    #[cfg(not(unix))]
    {
        signal::ctrl_c().await
    }
}
