//! CLI command implementations for the Rowgate MCP server.

pub mod check;
pub mod serve;

use anyhow::{Context, Result};
use clap::Args;
use rowgate_core::config::{DATABASE_SERVICE_KEY_ENV, DATABASE_URL_ENV};
use rowgate_core::{DatabaseCredentials, RowgateConfig};
use std::path::Path;

/// Database connection arguments shared by every command.
#[derive(Args, Debug, Default)]
pub struct DatabaseArgs {
    /// PostgreSQL connection URL, e.g. postgres://postgres@db.example.com:5432/postgres
    #[arg(long, global = true, env = DATABASE_URL_ENV, hide_env_values = true)]
    pub database_url: Option<String>,

    /// Service credential used as the connection password
    #[arg(long, global = true, env = DATABASE_SERVICE_KEY_ENV, hide_env_values = true)]
    pub service_key: Option<String>,

    /// Reject update/delete calls that carry no filters
    #[arg(long, global = true, env = "ROWGATE_REQUIRE_MUTATION_FILTERS")]
    pub require_mutation_filters: bool,
}

/// Everything a command needs once flags, environment and file are merged.
#[derive(Debug)]
pub struct Settings {
    pub config: RowgateConfig,
    pub credentials: DatabaseCredentials,
}

impl Settings {
    /// Resolve credentials and load the config file if present.
    ///
    /// The mutation guardrail is on when either the flag or the file
    /// enables it.
    pub fn load(config_path: &Path, args: DatabaseArgs) -> Result<Self> {
        let credentials = DatabaseCredentials::resolve(args.database_url, args.service_key)
            .context("database credentials are not configured")?;

        let mut config = RowgateConfig::load_or_default(config_path)
            .with_context(|| format!("failed to load config from {}", config_path.display()))?;
        config.guardrails.require_mutation_filters |= args.require_mutation_filters;

        Ok(Self { config, credentials })
    }
}
