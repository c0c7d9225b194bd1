//! CLI command definitions.

use clap::{Args, Subcommand};
use runtrace_api::ReceiverConfig;
use runtrace_trace::{LogFormat, OtlpSinkConfig, SinkConfig};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the webhook receiver
    Serve(ServeArgs),

    /// Convert a saved webhook payload and print it as OTLP/JSON
    Convert(ConvertArgs),

    /// Print the signature headers GitHub would send for a payload
    Sign {
        /// Path to the payload file
        payload: PathBuf,

        /// Webhook secret
        #[arg(long, env = "RUNTRACE_SECRET")]
        secret: String,
    },
}

/// Overrides applied on top of the configuration file.
#[derive(Args)]
pub struct ServeArgs {
    /// Listen address
    #[arg(long, env = "RUNTRACE_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Webhook path
    #[arg(long, env = "RUNTRACE_PATH")]
    pub path: Option<String>,

    /// Webhook secret
    #[arg(long, env = "RUNTRACE_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Reject unsigned deliveries when a secret is set
    #[arg(long)]
    pub require_signature: bool,

    /// Export traces to this OTLP/HTTP collector instead of the log
    #[arg(long, env = "RUNTRACE_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(flatten)]
    pub service_name: ServiceNameArgs,
}

impl ServeArgs {
    pub fn apply(self, config: &mut ReceiverConfig) {
        if let Some(endpoint) = self.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(path) = self.path {
            config.path = path;
        }
        if let Some(secret) = self.secret {
            config.secret = secret;
        }
        if self.require_signature {
            config.require_signature = true;
        }
        if let Some(endpoint) = self.otlp_endpoint {
            config.sink = SinkConfig::Otlp(OtlpSinkConfig {
                endpoint,
                ..Default::default()
            });
        }
        if self.json_logs {
            config.telemetry.log_format = LogFormat::Json;
        }
        self.service_name.apply(config);
    }
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Path to the payload file
    pub payload: PathBuf,

    /// Value of the X-Hub-Signature-256 header to verify
    #[arg(long)]
    pub signature_256: Option<String>,

    /// Value of the X-Hub-Signature header to verify
    #[arg(long)]
    pub signature: Option<String>,

    /// Webhook secret used to verify the signature headers
    #[arg(long, env = "RUNTRACE_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Also hand the trace to the configured sink
    #[arg(long)]
    pub export: bool,

    #[command(flatten)]
    pub service_name: ServiceNameArgs,
}

#[derive(Args, Default)]
pub struct ServiceNameArgs {
    /// Use this service.name verbatim
    #[arg(long)]
    pub custom_service_name: Option<String>,

    #[arg(long)]
    pub service_name_prefix: Option<String>,

    #[arg(long)]
    pub service_name_suffix: Option<String>,
}

impl ServiceNameArgs {
    pub fn apply(self, config: &mut ReceiverConfig) {
        let names = &mut config.service_names;
        if let Some(v) = self.custom_service_name {
            names.custom_service_name = v;
        }
        if let Some(v) = self.service_name_prefix {
            names.service_name_prefix = v;
        }
        if let Some(v) = self.service_name_suffix {
            names.service_name_suffix = v;
        }
    }
}
