// Copyright (c) 2025 - Cowboy AI, Inc.
//! Migration Configuration
//!
//! Settings are read from YAML and may be overridden from the environment:
//!
//! | Variable | Field |
//! |---|---|
//! | `MIGRATION_NAME_PREFIX` | `name_prefix` |
//! | `MIGRATION_OVERRIDE` | `override_connections` |
//! | `MIGRATION_ASSOCIATIONS` | `associations_path` |
//! | `MIGRATION_CALL_TIMEOUT_SECS` | `executor.call_timeout_secs` |
//! | `MIGRATION_ROLLBACK` | `executor.rollback_on_failure` |
//! | `MIGRATION_CHANNEL_PREFERENCE` | `channel_preference` |

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::errors::ConfigurationError;

/// Which association channel wins when address and name disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelPreference {
    #[default]
    Address,
    Name,
}

impl FromStr for ChannelPreference {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "address" => Ok(ChannelPreference::Address),
            "name" => Ok(ChannelPreference::Name),
            other => Err(ConfigurationError::InvalidValue {
                key: "channel_preference".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Executor behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutorSettings {
    /// Upper bound for one action's external calls
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,

    /// Allow rollback of failed actions that declare a rollback trigger
    #[serde(default = "default_rollback")]
    pub rollback_on_failure: bool,
}

fn default_call_timeout() -> u64 {
    60
}

fn default_rollback() -> bool {
    true
}

impl ExecutorSettings {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            call_timeout_secs: default_call_timeout(),
            rollback_on_failure: default_rollback(),
        }
    }
}

/// Top-level migration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Prefix for generated destination names
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,

    /// Replace existing destination connections
    #[serde(default, rename = "override")]
    pub override_connections: bool,

    /// Association rule table location
    #[serde(default)]
    pub associations_path: Option<PathBuf>,

    #[serde(default)]
    pub channel_preference: ChannelPreference,

    #[serde(default)]
    pub executor: ExecutorSettings,
}

fn default_name_prefix() -> String {
    "new_".to_string()
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            name_prefix: default_name_prefix(),
            override_connections: false,
            associations_path: None,
            channel_preference: ChannelPreference::default(),
            executor: ExecutorSettings::default(),
        }
    }
}

impl MigrationConfig {
    /// Parse configuration from YAML; missing keys take defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read configuration from a YAML file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Defaults overridden by `MIGRATION_*` environment variables
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment, tests)
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("MIGRATION_NAME_PREFIX") {
            self.name_prefix = prefix;
        }
        if let Some(value) = lookup("MIGRATION_OVERRIDE") {
            self.override_connections = parse_flag("MIGRATION_OVERRIDE", &value)?;
        }
        if let Some(path) = lookup("MIGRATION_ASSOCIATIONS") {
            self.associations_path = Some(PathBuf::from(path));
        }
        if let Some(value) = lookup("MIGRATION_CALL_TIMEOUT_SECS") {
            self.executor.call_timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigurationError::InvalidValue {
                        key: "MIGRATION_CALL_TIMEOUT_SECS".to_string(),
                        value: value.clone(),
                    })?;
        }
        if let Some(value) = lookup("MIGRATION_ROLLBACK") {
            self.executor.rollback_on_failure = parse_flag("MIGRATION_ROLLBACK", &value)?;
        }
        if let Some(value) = lookup("MIGRATION_CHANNEL_PREFERENCE") {
            self.channel_preference = value.parse()?;
        }
        Ok(self)
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigurationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigurationError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = MigrationConfig::default();
        assert_eq!(config.name_prefix, "new_");
        assert!(!config.override_connections);
        assert_eq!(config.channel_preference, ChannelPreference::Address);
        assert_eq!(config.executor.call_timeout(), Duration::from_secs(60));
        assert!(config.executor.rollback_on_failure);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = MigrationConfig::from_yaml_str(
            "override: true\nchannel_preference: name\nexecutor:\n  call_timeout_secs: 5\n",
        )
        .unwrap();
        assert!(config.override_connections);
        assert_eq!(config.channel_preference, ChannelPreference::Name);
        assert_eq!(config.executor.call_timeout_secs, 5);
        assert!(config.executor.rollback_on_failure);
        assert_eq!(config.name_prefix, "new_");
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(
            MigrationConfig::from_yaml_str("  \n").unwrap(),
            MigrationConfig::default()
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("MIGRATION_NAME_PREFIX", "migrated_"),
            ("MIGRATION_OVERRIDE", "yes"),
            ("MIGRATION_CALL_TIMEOUT_SECS", "12"),
            ("MIGRATION_CHANNEL_PREFERENCE", "Name"),
        ]
        .into_iter()
        .collect();

        let config = MigrationConfig::default()
            .with_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.name_prefix, "migrated_");
        assert!(config.override_connections);
        assert_eq!(config.executor.call_timeout_secs, 12);
        assert_eq!(config.channel_preference, ChannelPreference::Name);
    }

    #[test]
    fn test_invalid_env_value() {
        let result = MigrationConfig::default().with_overrides(|key| {
            (key == "MIGRATION_ROLLBACK").then(|| "maybe".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidValue { .. })
        ));
    }
}
