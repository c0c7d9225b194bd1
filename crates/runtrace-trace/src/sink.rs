//! Trace sinks: where finished traces are handed off.

use crate::otlp::ExportTraceServiceRequest;
use async_trait::async_trait;
use runtrace_core::ports::TraceSink;
use runtrace_core::{Error, Result, Trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Collector rejected export with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<SinkError> for Error {
    fn from(err: SinkError) -> Self {
        Error::DownstreamConsume(err.to_string())
    }
}

/// Sink selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Write each trace to the process log.
    #[default]
    Log,
    /// Export to an OTLP/HTTP collector.
    Otlp(OtlpSinkConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtlpSinkConfig {
    #[serde(default = "default_otlp_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_otlp_endpoint() -> String {
    "http://localhost:4318".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for OtlpSinkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_otlp_endpoint(),
            headers: HashMap::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Posts traces as OTLP/JSON to `{endpoint}/v1/traces`.
pub struct OtlpHttpSink {
    config: OtlpSinkConfig,
    url: String,
    client: reqwest::Client,
}

impl OtlpHttpSink {
    pub fn new(config: OtlpSinkConfig) -> std::result::Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        let url = format!("{}/v1/traces", config.endpoint.trim_end_matches('/'));
        Ok(Self {
            config,
            url,
            client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn export(&self, trace: &Trace) -> std::result::Result<(), SinkError> {
        let body = serde_json::to_vec(&ExportTraceServiceRequest::from(trace))?;
        debug!(url = %self.url, bytes = body.len(), "Exporting trace");

        let mut request = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (key, value) in &self.config.headers {
            request = request.header(key, value);
        }

        let response = request.body(body).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected { status, body });
        }

        Ok(())
    }
}

#[async_trait]
impl TraceSink for OtlpHttpSink {
    async fn accept(&self, trace: Trace) -> Result<()> {
        if trace.spans.is_empty() {
            debug!("Trace has no spans, skipping export");
            return Ok(());
        }
        self.export(&trace).await?;
        info!(spans = trace.span_count(), "Trace exported");
        Ok(())
    }
}

/// Logs each trace as JSON at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl TraceSink for LogSink {
    async fn accept(&self, trace: Trace) -> Result<()> {
        let encoded = serde_json::to_string(&ExportTraceServiceRequest::from(&trace))
            .map_err(|e| Error::DownstreamConsume(e.to_string()))?;
        info!(spans = trace.span_count(), trace = %encoded, "Trace received");
        Ok(())
    }
}

/// Create a sink from configuration.
pub fn create_sink(config: &SinkConfig) -> std::result::Result<Arc<dyn TraceSink>, SinkError> {
    match config {
        SinkConfig::Log => Ok(Arc::new(LogSink)),
        SinkConfig::Otlp(c) => Ok(Arc::new(OtlpHttpSink::new(c.clone())?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_config_shapes() {
        let log: SinkConfig = serde_json::from_str(r#"{"type": "log"}"#).unwrap();
        assert_eq!(log, SinkConfig::Log);

        let otlp: SinkConfig =
            serde_json::from_str(r#"{"type": "otlp", "endpoint": "http://collector:4318"}"#)
                .unwrap();
        let SinkConfig::Otlp(c) = otlp else {
            panic!("expected otlp sink");
        };
        assert_eq!(c.endpoint, "http://collector:4318");
        assert_eq!(c.timeout_seconds, 10);
        assert!(c.headers.is_empty());
    }

    #[test]
    fn test_url_joins_path() {
        let sink = OtlpHttpSink::new(OtlpSinkConfig {
            endpoint: "http://collector:4318/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(sink.url(), "http://collector:4318/v1/traces");
    }

    #[test]
    fn test_sink_error_maps_to_downstream() {
        let err: Error = SinkError::Rejected {
            status: 503,
            body: "busy".into(),
        }
        .into();
        assert!(matches!(err, Error::DownstreamConsume(ref m) if m.contains("503")));
    }
}
