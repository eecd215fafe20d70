//! Database connection configuration.
//!
//! Credentials come only from the environment (or the equivalent CLI
//! flags): `DATABASE_URL` names the PostgreSQL endpoint and
//! `DATABASE_SERVICE_KEY` is the privileged credential used as the
//! connection password. Pool sizing and TLS mode may also be set in the
//! YAML config file.

use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Environment variable holding the PostgreSQL connection URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Environment variable holding the service credential.
pub const DATABASE_SERVICE_KEY_ENV: &str = "DATABASE_SERVICE_KEY";

/// Non-secret database settings from the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SSL mode for the connection. When unset, whatever the URL says wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_mode: Option<SslMode>,

    /// Connection pool configuration.
    #[serde(default)]
    pub pool: ConnectionPoolConfig,
}

/// SSL mode for database connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SslMode {
    /// Disable SSL.
    Disable,
    /// Allow SSL but don't require it.
    Allow,
    /// Prefer SSL (default).
    #[default]
    Prefer,
    /// Require SSL.
    Require,
    /// Require SSL with CA verification.
    #[serde(rename = "verify-ca")]
    VerifyCa,
    /// Require SSL with full verification.
    #[serde(rename = "verify-full")]
    VerifyFull,
}

/// Connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionPoolConfig {
    /// Minimum number of connections to maintain.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Timeout in seconds when acquiring a connection.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_seconds: u32,

    /// How long a connection can remain idle before being closed.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u32,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            min_connections: default_min_connections(),
            max_connections: default_max_connections(),
            acquire_timeout_seconds: default_acquire_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

fn default_min_connections() -> u32 {
    1
}

fn default_max_connections() -> u32 {
    10
}

fn default_acquire_timeout() -> u32 {
    30
}

fn default_idle_timeout() -> u32 {
    600
}

/// Connection URL plus service credential.
///
/// `Debug` never prints the service key.
#[derive(Clone)]
pub struct DatabaseCredentials {
    url: String,
    service_key: String,
}

impl DatabaseCredentials {
    /// Build credentials from already-resolved values.
    ///
    /// Both values are required; an absent or blank value is a
    /// [`ConfigError::MissingVariable`].
    pub fn resolve(url: Option<String>, service_key: Option<String>) -> Result<Self, ConfigError> {
        let url = non_blank(url).ok_or(ConfigError::MissingVariable(DATABASE_URL_ENV))?;
        let service_key =
            non_blank(service_key).ok_or(ConfigError::MissingVariable(DATABASE_SERVICE_KEY_ENV))?;
        Ok(Self { url, service_key })
    }

    /// Read `DATABASE_URL` and `DATABASE_SERVICE_KEY` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(
            std::env::var(DATABASE_URL_ENV).ok(),
            std::env::var(DATABASE_SERVICE_KEY_ENV).ok(),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn service_key(&self) -> &str {
        &self.service_key
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("url", &redact_url_password(&self.url))
            .field("service_key", &"<redacted>")
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Replace the password component of a connection URL, if any.
///
/// Strings that do not parse as a URL are returned unchanged.
pub fn redact_url_password(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut url) if url.password().is_some() => match url.set_password(Some("***")) {
            Ok(()) => url.to_string(),
            Err(()) => raw.to_string(),
        },
        _ => raw.to_string(),
    }
}
