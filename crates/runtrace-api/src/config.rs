//! Receiver configuration.

use runtrace_core::{Error, Result};
use runtrace_trace::{ServiceNameConfig, SinkConfig, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Receiver configuration, loaded from YAML.
///
/// Every key is optional. The service-name overrides sit at the top level
/// alongside `secret`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    /// Listen address.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Path the webhook is posted to.
    #[serde(default = "default_path")]
    pub path: String,
    /// Webhook secret. Signature checks are skipped when empty.
    #[serde(default)]
    pub secret: String,
    /// Reject deliveries without a signature header when a secret is set.
    #[serde(default)]
    pub require_signature: bool,
    #[serde(flatten)]
    pub service_names: ServiceNameConfig,
    #[serde(default)]
    pub sink: SinkConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

pub(crate) const RESERVED_PATHS: [&str; 2] = ["/health", "/ready"];

fn default_endpoint() -> String {
    "0.0.0.0:19418".to_string()
}

fn default_path() -> String {
    "/events".to_string()
}

// GitHub caps webhook payloads at 25 MB.
fn default_max_body_bytes() -> usize {
    25 * 1024 * 1024
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            path: default_path(),
            secret: String::new(),
            require_signature: false,
            service_names: ServiceNameConfig::default(),
            sink: SinkConfig::default(),
            telemetry: TelemetryConfig::default(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ReceiverConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self> {
        serde_yaml::from_str(contents).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::Config("missing a receiver endpoint".to_string()));
        }
        if !self.path.starts_with('/') {
            return Err(Error::Config(format!(
                "webhook path must start with '/': {}",
                self.path
            )));
        }
        if RESERVED_PATHS.contains(&self.path.as_str()) {
            return Err(Error::Config(format!(
                "webhook path collides with a built-in route: {}",
                self.path
            )));
        }
        if self.max_body_bytes == 0 {
            return Err(Error::Config("max_body_bytes must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use runtrace_trace::{LogFormat, OtlpSinkConfig};

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = ReceiverConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ReceiverConfig::default());
        assert_eq!(config.endpoint, "0.0.0.0:19418");
        assert_eq!(config.path, "/events");
        config.validate().unwrap();
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
endpoint: "127.0.0.1:9000"
path: /github
secret: s3cret
require_signature: true
service_name_prefix: "ci-"
custom_service_name: ""
sink:
  type: otlp
  endpoint: http://collector:4318
  headers:
    x-api-key: abc
telemetry:
  log_format: json
"#;
        let config = ReceiverConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.endpoint, "127.0.0.1:9000");
        assert_eq!(config.path, "/github");
        assert_eq!(config.secret, "s3cret");
        assert!(config.require_signature);
        assert_eq!(config.service_names.service_name_prefix, "ci-");
        assert_eq!(config.service_names.resolve("Org/Repo"), "ci-org-repo");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(
            config.sink,
            SinkConfig::Otlp(OtlpSinkConfig {
                endpoint: "http://collector:4318".into(),
                headers: [("x-api-key".to_string(), "abc".to_string())].into(),
                timeout_seconds: 10,
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let config = ReceiverConfig {
            endpoint: "  ".into(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("missing a receiver endpoint"));
    }

    #[test]
    fn test_validate_rejects_relative_path() {
        let config = ReceiverConfig {
            path: "events".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_builtin_route() {
        let config = ReceiverConfig {
            path: "/health".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_yaml_is_config_error() {
        assert!(matches!(
            ReceiverConfig::from_yaml("endpoint: [unclosed"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ReceiverConfig::from_file(Path::new("/nonexistent/runtrace.yaml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
