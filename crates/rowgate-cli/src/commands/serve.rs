//! `rowgate serve` command implementation.
//!
//! Builds the connection pool once, wraps it in the shared executor and
//! serves the CRUD tools over stdio until the client disconnects or the
//! process is interrupted.

use super::Settings;
use anyhow::{Context, Result};
use rmcp::{ServiceExt, transport::stdio};
use rowgate_adapter_pg::PostgresStore;
use rowgate_core::config::redact_url_password;
use rowgate_mcp::{CrudExecutor, RowgateMcpService};
use std::sync::Arc;

pub async fn run(settings: Settings) -> Result<()> {
    let target = redact_url_password(settings.credentials.url());
    let store = PostgresStore::connect(&settings.credentials, &settings.config.database)
        .await
        .with_context(|| format!("failed to connect to {target}"))?;

    let require_filters = settings.config.guardrails.require_mutation_filters;
    let executor =
        CrudExecutor::new(Arc::new(store)).with_require_mutation_filters(require_filters);

    tracing::info!(
        database = %target,
        require_mutation_filters = require_filters,
        "Starting MCP server on stdio"
    );

    let service = RowgateMcpService::new(Arc::new(executor))
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;

    tokio::select! {
        result = service.waiting() => {
            let reason = result.context("MCP server task failed")?;
            tracing::info!(?reason, "MCP session ended");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received shutdown signal");
        }
    }

    Ok(())
}
