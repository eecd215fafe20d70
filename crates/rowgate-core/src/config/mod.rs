//! Configuration types for Rowgate.
//!
//! Secrets (`DATABASE_URL`, `DATABASE_SERVICE_KEY`) are read from the
//! process environment once at startup, see [`DatabaseCredentials`]. The
//! optional `rowgate.yaml` file carries everything else:
//!
//! ```yaml
//! database:
//!   ssl_mode: require
//!   pool:
//!     max_connections: 5
//! guardrails:
//!   require_mutation_filters: true
//! ```

pub mod database;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use database::{
    ConnectionPoolConfig, DATABASE_SERVICE_KEY_ENV, DATABASE_URL_ENV, DatabaseConfig,
    DatabaseCredentials, SslMode, redact_url_password,
};

/// Complete Rowgate configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowgateConfig {
    /// Database pool and TLS settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Safety rails for mutating tools.
    #[serde(default)]
    pub guardrails: GuardrailsConfig,
}

/// Global guardrails configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardrailsConfig {
    /// Reject `update_records` / `delete_records` calls without filters
    /// instead of letting them touch every row.
    #[serde(default)]
    pub require_mutation_filters: bool,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in the environment and must not be empty")]
    MissingVariable(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RowgateConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}
