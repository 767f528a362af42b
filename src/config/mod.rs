//! Process configuration
//!
//! Values are layered: built-in defaults, then the YAML file named by
//! `TORO_CONFIG` (if set), then individual `TORO_*` environment variables.

use crate::core::error::ConfigError;
use crate::storage::Backend;
use serde::{Deserialize, Serialize};

pub const ENV_CONFIG_FILE: &str = "TORO_CONFIG";
pub const ENV_DATABASE_URL: &str = "TORO_DATABASE_URL";
pub const ENV_BIND_ADDR: &str = "TORO_BIND_ADDR";
pub const ENV_MAX_CREATE_ATTEMPTS: &str = "TORO_MAX_CREATE_ATTEMPTS";
pub const ENV_LOG_LEVEL: &str = "TORO_LOG_LEVEL";

/// Complete configuration of the order server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// `sqlite://…`, `postgres://…` or `memory:`
    pub database_url: String,
    pub bind_addr: String,
    /// Insert attempts before contention is reported as a conflict
    pub max_create_attempts: u32,
    /// Fallback log filter when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://toro.db".to_string(),
            bind_addr: "0.0.0.0:5000".to_string(),
            max_create_attempts: 5,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::ParseError {
                file: Some(path.to_string()),
                message,
            },
            other => other,
        })
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(ENV_CONFIG_FILE) {
            Some(path) => Self::from_yaml_file(&path)?,
            None => Self::default(),
        };

        if let Some(url) = lookup(ENV_DATABASE_URL) {
            config.database_url = url;
        }
        if let Some(addr) = lookup(ENV_BIND_ADDR) {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup(ENV_MAX_CREATE_ATTEMPTS) {
            config.max_create_attempts =
                raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    field: "max_create_attempts".to_string(),
                    value: raw.clone(),
                    message: "expected a positive integer".to_string(),
                })?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_create_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_create_attempts".to_string(),
                value: "0".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Backend::from_url(&self.database_url)?;
        Ok(())
    }

    /// Backend the configured URL selects
    pub fn backend(&self) -> Result<Backend, ConfigError> {
        Backend::from_url(&self.database_url)
    }
}
