//! `rowgate check` command implementation.
//!
//! Connects with the configured credentials and runs `SELECT 1`.

use super::Settings;
use anyhow::{Context, Result};
use rowgate_adapter_pg::PostgresStore;
use rowgate_core::config::redact_url_password;

pub async fn run(settings: Settings) -> Result<()> {
    let target = redact_url_password(settings.credentials.url());
    tracing::info!(database = %target, "Checking database connectivity");

    let store = PostgresStore::connect(&settings.credentials, &settings.config.database)
        .await
        .with_context(|| format!("failed to connect to {target}"))?;
    store
        .ping()
        .await
        .with_context(|| format!("connected to {target} but SELECT 1 failed"))?;

    println!("✅ Database reachable: {target}");
    Ok(())
}
