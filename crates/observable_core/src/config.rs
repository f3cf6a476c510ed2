//! Registry configuration
//!
//! Behaviour knobs for the two deregistration corner cases. Loadable from a
//! TOML document with a `[registry]` table; every field has a default.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid registry config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize registry config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// What `off(event)` does when the event has no handlers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingEventPolicy {
    /// Fail with `NoHandlerFound`
    #[default]
    Error,
    /// Succeed without doing anything
    Ignore,
}

/// How `off_handlers` treats a handler that is not registered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalMode {
    /// Remove in order; handlers before the bad one stay removed
    #[default]
    FirstErrorStops,
    /// Validate every handler first; remove nothing on error
    Transactional,
}

/// Registry behaviour settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub missing_event: MissingEventPolicy,
    #[serde(default)]
    pub removal: RemovalMode,
}

/// Top-level configuration document
#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(default)]
    registry: RegistryConfig,
}

impl RegistryConfig {
    /// Parse from a TOML document containing an optional `[registry]` table
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(source)?;
        Ok(file.registry)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.as_ref().display(), ?config, "loaded registry config");
        Ok(config)
    }

    /// Serialize back to a TOML document
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        let file = ConfigFile { registry: *self };
        Ok(toml::to_string_pretty(&file)?)
    }

    pub fn with_missing_event(mut self, policy: MissingEventPolicy) -> Self {
        self.missing_event = policy;
        self
    }

    pub fn with_removal(mut self, mode: RemovalMode) -> Self {
        self.removal = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_when_empty() {
        let config = RegistryConfig::from_toml_str("").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.missing_event, MissingEventPolicy::Error);
        assert_eq!(config.removal, RemovalMode::FirstErrorStops);
    }

    #[test]
    fn test_parse_registry_table() {
        let config = RegistryConfig::from_toml_str(
            r#"
            [registry]
            missing_event = "ignore"
            removal = "transactional"
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            RegistryConfig::default()
                .with_missing_event(MissingEventPolicy::Ignore)
                .with_removal(RemovalMode::Transactional)
        );
    }

    #[test]
    fn test_partial_table_keeps_defaults() {
        let config = RegistryConfig::from_toml_str("[registry]\nremoval = \"transactional\"\n").unwrap();
        assert_eq!(config.missing_event, MissingEventPolicy::Error);
        assert_eq!(config.removal, RemovalMode::Transactional);
    }

    #[test]
    fn test_rejects_unknown_policy() {
        let err = RegistryConfig::from_toml_str("[registry]\nmissing_event = \"panic\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = RegistryConfig::default().with_missing_event(MissingEventPolicy::Ignore);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("missing_event = \"ignore\""));
        assert_eq!(RegistryConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_serialize_reports_errors() {
        let text = RegistryConfig::default().to_toml_string().unwrap();
        assert!(text.contains("[registry]"));

        let err: ConfigError = <toml::ser::Error as serde::ser::Error>::custom("bad value").into();
        assert!(matches!(err, ConfigError::Serialize(_)));
        assert!(err.to_string().starts_with("failed to serialize registry config"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RegistryConfig::load("/nonexistent/observable.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
