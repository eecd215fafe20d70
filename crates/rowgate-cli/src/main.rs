use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{DatabaseArgs, Settings};

#[derive(Parser, Debug)]
#[command(name = "rowgate", version, about = "MCP server exposing CRUD tools over PostgreSQL")]
struct Cli {
    /// Path to the optional YAML configuration file
    #[arg(long, global = true, default_value = "rowgate.yaml")]
    config: PathBuf,

    /// Log filter (overrides RUST_LOG), e.g. "debug" or "rowgate_mcp=debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(flatten)]
    database: DatabaseArgs,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Serve the CRUD tools over stdio (default).
    Serve,

    /// Connect to the database, run SELECT 1 and exit.
    Check,
}

/// Logs go to stderr; stdout carries the MCP protocol.
fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real environment variables take precedence.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let settings = Settings::load(&cli.config, cli.database)?;

    match cli.cmd.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(settings).await,
        Command::Check => commands::check::run(settings).await,
    }
}
