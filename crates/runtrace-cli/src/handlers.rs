//! Command handlers.

use crate::commands::ConvertArgs;
use anyhow::Context;
use console::style;
use runtrace_api::{ReceiverConfig, WebhookProcessor};
use runtrace_core::ports::TraceSink;
use runtrace_trace::{ExportTraceServiceRequest, LogSink, create_sink, shutdown_telemetry};
use runtrace_webhook::{SignatureScheme, WebhookRequest};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Run the receiver until a shutdown signal arrives.
pub async fn serve(config: ReceiverConfig) -> anyhow::Result<()> {
    config.validate()?;
    let sink = create_sink(&config.sink).context("Failed to create trace sink")?;
    info!(sink = ?config.sink, "Starting runtrace receiver");

    let result = runtrace_api::serve(&config, sink).await;
    shutdown_telemetry();
    result.map_err(Into::into)
}

/// Convert a payload file offline and print the OTLP/JSON document.
pub async fn convert(config: ReceiverConfig, args: ConvertArgs) -> anyhow::Result<()> {
    let result = convert_payload(config, args).await;
    shutdown_telemetry();
    result
}

async fn convert_payload(mut config: ReceiverConfig, args: ConvertArgs) -> anyhow::Result<()> {
    let body = read_payload(&args.payload)?;
    if let Some(secret) = args.secret {
        config.secret = secret;
    }
    args.service_name.apply(&mut config);

    let mut request = WebhookRequest::new(&body);
    if let Some(header) = args.signature_256.as_deref() {
        request = request.with_signature_256(header);
    }
    if let Some(header) = args.signature.as_deref() {
        request = request.with_signature(header);
    }

    let sink: Arc<dyn TraceSink> = if args.export {
        create_sink(&config.sink).context("Failed to create trace sink")?
    } else {
        Arc::new(LogSink)
    };
    let processor = WebhookProcessor::from_config(&config, sink.clone());

    let trace = processor.convert(&request)?;
    let document = serde_json::to_string_pretty(&ExportTraceServiceRequest::from(&trace))?;
    println!("{document}");

    if args.export {
        let spans = trace.span_count();
        sink.accept(trace).await?;
        eprintln!("{} Exported {} spans", style("✓").green(), spans);
    }

    Ok(())
}

/// Print the signature headers for a payload file.
pub fn sign(payload: &Path, secret: &str) -> anyhow::Result<()> {
    let body = read_payload(payload)?;
    for scheme in [SignatureScheme::Sha256, SignatureScheme::Sha1] {
        println!(
            "{}: {}",
            style(scheme.header_name()).bold(),
            scheme.sign(secret, &body)
        );
    }
    Ok(())
}

fn read_payload(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read payload {}", path.display()))
}
