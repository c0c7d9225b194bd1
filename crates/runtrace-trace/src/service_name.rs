//! `service.name` resolution.

use serde::{Deserialize, Serialize};

/// Overrides for the `service.name` resource attribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceNameConfig {
    /// Used verbatim when set.
    #[serde(default)]
    pub custom_service_name: String,
    #[serde(default)]
    pub service_name_prefix: String,
    #[serde(default)]
    pub service_name_suffix: String,
}

impl ServiceNameConfig {
    pub fn resolve(&self, repo_full_name: &str) -> String {
        resolve(
            &self.custom_service_name,
            &self.service_name_prefix,
            &self.service_name_suffix,
            repo_full_name,
        )
    }
}

/// `custom` if non-empty, else `prefix + normalized(repo) + suffix` where the
/// repository name is lower-cased and `/`, `_` become `-`.
pub fn resolve(custom: &str, prefix: &str, suffix: &str, repo_full_name: &str) -> String {
    if !custom.is_empty() {
        return custom.to_string();
    }
    let normalized = repo_full_name.replace(['/', '_'], "-").to_lowercase();
    format!("{prefix}{normalized}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_repository() {
        assert_eq!(resolve("", "ci-", "", "Org/Repo_Name"), "ci-org-repo-name");
        assert_eq!(resolve("", "", "", "octo/hello-world"), "octo-hello-world");
    }

    #[test]
    fn test_custom_name_wins() {
        assert_eq!(resolve("My_Service", "ci-", "-x", "Org/Repo"), "My_Service");
    }

    #[test]
    fn test_prefix_and_suffix() {
        let config = ServiceNameConfig {
            custom_service_name: String::new(),
            service_name_prefix: "gh-".into(),
            service_name_suffix: "-ci".into(),
        };
        assert_eq!(config.resolve("Acme/Big_App"), "gh-acme-big-app-ci");
    }
}
