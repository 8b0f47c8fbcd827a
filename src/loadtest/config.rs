//! TOML-based load test configuration.
//!
//! # Example TOML
//!
//! ```toml
//! targets = [
//!     "https://api.example.com/health",
//!     "{{base_url}}/users",
//! ]
//!
//! [settings]
//! requested_volume = 10000
//! concurrency = 100
//!
//! [variables]
//! base_url = "https://api.example.com"
//! ```
//!
//! `targets` may contain `{{variable}}` placeholders; they are resolved from
//! the `[variables]` table before dispatch. Targets can also be selected from
//! a collection file on the command line, in which case the config only
//! contributes settings and variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::collection::variables;
use crate::loadtest::engine::validate_targets;
use crate::loadtest::error::LoadTestError;

/// Default number of requests asked for when none is configured.
pub const DEFAULT_REQUESTED_VOLUME: u64 = 10_000;

/// Default worker pool size when none is configured.
pub const DEFAULT_CONCURRENCY: u32 = 100;

/// Top-level load test configuration parsed from a TOML file.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct LoadTestConfig {
    /// Volume and concurrency settings.
    #[serde(default)]
    pub settings: Settings,
    /// Target URLs, possibly containing placeholders.
    #[serde(default)]
    pub targets: Vec<String>,
    /// Values for `{{variable}}` placeholders.
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

/// Settings controlling how many requests are dispatched and how many run at once.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Number of requests asked for. The engine dispatches the largest
    /// multiple of the target count that does not exceed this value.
    #[serde(default = "default_requested_volume")]
    pub requested_volume: u64,
    /// Number of concurrent workers.
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

fn default_requested_volume() -> u64 {
    DEFAULT_REQUESTED_VOLUME
}

fn default_concurrency() -> u32 {
    DEFAULT_CONCURRENCY
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            requested_volume: DEFAULT_REQUESTED_VOLUME,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl LoadTestConfig {
    /// Parse a TOML string into a [`LoadTestConfig`] with validated settings.
    ///
    /// Returns an error if the TOML is malformed or the settings are invalid.
    pub fn from_toml(content: &str) -> Result<Self, LoadTestError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a [`LoadTestConfig`] from a file path and validate its settings.
    ///
    /// Returns [`LoadTestError::ConfigIo`] if the file cannot be read,
    /// [`LoadTestError::ConfigParse`] if the TOML is malformed, or
    /// [`LoadTestError::ConfigValidation`] if validation fails.
    pub fn load(path: &Path) -> Result<Self, LoadTestError> {
        let content = std::fs::read_to_string(path).map_err(|source| LoadTestError::ConfigIo {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Configured targets with placeholders resolved from `variables`.
    pub fn resolved_targets(&self) -> Vec<String> {
        self.targets
            .iter()
            .map(|target| variables::resolve(target, &self.variables))
            .collect()
    }

    /// Validate the settings.
    ///
    /// Targets are not checked here: their placeholders may still be filled
    /// in by command-line variables. Use [`Self::validated_targets`] once the
    /// variables are final.
    pub fn validate(&self) -> Result<(), LoadTestError> {
        if self.settings.concurrency == 0 {
            return Err(LoadTestError::ConfigValidation {
                message: "settings.concurrency must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve `targets` and check that every one is an absolute http(s) URL.
    pub fn validated_targets(&self) -> Result<Vec<String>, LoadTestError> {
        let targets = self.resolved_targets();
        validate_targets(&targets)?;
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
targets = ["{{base}}/users", "https://api.example.com/health"]

[settings]
requested_volume = 500
concurrency = 20

[variables]
base = "http://localhost:8080"
"#;
        let config = LoadTestConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.settings.requested_volume, 500);
        assert_eq!(config.settings.concurrency, 20);
        assert_eq!(
            config.resolved_targets(),
            vec![
                "http://localhost:8080/users",
                "https://api.example.com/health"
            ]
        );
    }

    #[test]
    fn test_parse_defaults() {
        let config = LoadTestConfig::from_toml("").unwrap();
        assert_eq!(config.settings.requested_volume, DEFAULT_REQUESTED_VOLUME);
        assert_eq!(config.settings.concurrency, DEFAULT_CONCURRENCY);
        assert!(config.targets.is_empty());
        assert!(config.variables.is_empty());
    }

    #[test]
    fn test_parse_partial_settings() {
        let config = LoadTestConfig::from_toml("[settings]\nconcurrency = 5\n").unwrap();
        assert_eq!(config.settings.concurrency, 5);
        assert_eq!(config.settings.requested_volume, DEFAULT_REQUESTED_VOLUME);
    }

    #[test]
    fn test_validate_zero_concurrency_fails() {
        let result = LoadTestConfig::from_toml("[settings]\nconcurrency = 0\n");
        assert!(matches!(
            result.unwrap_err(),
            LoadTestError::ConfigValidation { .. }
        ));
    }

    #[test]
    fn test_templated_targets_load_before_variables_are_set() {
        let mut config = LoadTestConfig::from_toml(r#"targets = ["{{host}}/health"]"#).unwrap();
        assert!(matches!(
            config.validated_targets().unwrap_err(),
            LoadTestError::InvalidTarget { .. }
        ));

        config
            .variables
            .insert("host".to_string(), "http://localhost:8080".to_string());
        assert_eq!(
            config.validated_targets().unwrap(),
            vec!["http://localhost:8080/health"]
        );
    }

    #[test]
    fn test_validated_targets_empty_fails() {
        let config = LoadTestConfig::default();
        assert!(matches!(
            config.validated_targets().unwrap_err(),
            LoadTestError::EmptyTargets
        ));
    }

    #[test]
    fn test_invalid_toml_fails() {
        let result = LoadTestConfig::from_toml("[settings\nconcurrency = ");
        assert!(matches!(result.unwrap_err(), LoadTestError::ConfigParse { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[settings]\nrequested_volume = 42").unwrap();
        let config = LoadTestConfig::load(file.path()).unwrap();
        assert_eq!(config.settings.requested_volume, 42);
    }

    #[test]
    fn test_load_missing_file() {
        let result = LoadTestConfig::load(Path::new("/nonexistent/loadtest.toml"));
        assert!(matches!(result.unwrap_err(), LoadTestError::ConfigIo { .. }));
    }
}
