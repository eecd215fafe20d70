//! Shared test infrastructure for Rowgate PostgreSQL end-to-end tests.
//!
//! This module provides:
//! - Docker container management for PostgreSQL
//! - Schema and seed data
//! - A connected `PostgresStore`

use rowgate_adapter_pg::PostgresStore;
use rowgate_core::config::{DatabaseConfig, DatabaseCredentials};
use rowgate_core::{Record, RecordStore};
use serde_json::Value;
use sqlx::PgPool;
use std::process::Command;
use std::time::Duration;

// =============================================================================
// DOCKER CONTAINER CONFIGURATION
// =============================================================================

pub const CONTAINER_NAME: &str = "rowgate_test_postgres";
pub const POSTGRES_PORT: u16 = 5434;
pub const POSTGRES_PASSWORD: &str = "rowgate_test_password";
pub const DATABASE_NAME: &str = "rowgate_test";

/// Connection URL without a password; the service key supplies it.
pub fn database_url() -> String {
    format!(
        "postgres://postgres@localhost:{}/{}",
        POSTGRES_PORT, DATABASE_NAME
    )
}

fn admin_url() -> String {
    format!(
        "postgres://postgres:{}@localhost:{}/{}",
        POSTGRES_PASSWORD, POSTGRES_PORT, DATABASE_NAME
    )
}

// =============================================================================
// DOCKER CONTAINER MANAGEMENT
// =============================================================================

/// Start a PostgreSQL container for testing
pub fn start_postgres_container() -> Result<(), String> {
    let output = Command::new("docker")
        .args(["ps", "-a", "-q", "-f", &format!("name={}", CONTAINER_NAME)])
        .output()
        .map_err(|e| format!("Failed to check existing container: {}", e))?;

    if !String::from_utf8_lossy(&output.stdout).trim().is_empty() {
        let _ = Command::new("docker")
            .args(["rm", "-f", CONTAINER_NAME])
            .output();
    }

    let status = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            CONTAINER_NAME,
            "-e",
            &format!("POSTGRES_PASSWORD={}", POSTGRES_PASSWORD),
            "-e",
            &format!("POSTGRES_DB={}", DATABASE_NAME),
            "-p",
            &format!("{}:5432", POSTGRES_PORT),
            "postgres:16-alpine",
        ])
        .status()
        .map_err(|e| format!("Failed to start container: {}", e))?;

    if !status.success() {
        return Err("Failed to start PostgreSQL container".to_string());
    }

    Ok(())
}

/// Stop and remove the PostgreSQL container
pub fn stop_postgres_container() {
    let _ = Command::new("docker")
        .args(["rm", "-f", CONTAINER_NAME])
        .output();
}

/// Wait for PostgreSQL to be ready
pub async fn wait_for_postgres() -> Result<PgPool, String> {
    for attempt in 1..=30 {
        if let Ok(pool) = PgPool::connect(&admin_url()).await
            && sqlx::query("SELECT 1").fetch_one(&pool).await.is_ok()
        {
            println!("✅ PostgreSQL ready after {} attempts", attempt);
            return Ok(pool);
        }
        if attempt % 5 == 0 {
            println!("⏳ Waiting for PostgreSQL... (attempt {})", attempt);
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }
    Err("PostgreSQL did not become ready in time".to_string())
}

// =============================================================================
// DATABASE INITIALIZATION
// =============================================================================

const SCHEMA_SQL: &str = r#"
DROP TABLE IF EXISTS members;
CREATE TABLE members (
    id          SERIAL PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT UNIQUE,
    country     TEXT,
    status      TEXT NOT NULL DEFAULT 'active',
    age         INTEGER,
    joined_on   DATE,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);
DROP TABLE IF EXISTS fares;
CREATE TABLE fares (
    id     INTEGER PRIMARY KEY,
    code   VARCHAR(3) NOT NULL,
    price  NUMERIC(5,2) NOT NULL
);
"#;

const SEED_SQL: &str = r#"
INSERT INTO members (id, name, email, country, status, age, joined_on) VALUES
    (1,   'Aroha Ngata',   'aroha@example.com',  'New Zealand', 'active',   34, '2021-03-01'),
    (2,   'Ben Carter',    'ben@example.com',    'Australia',   'inactive', 41, '2020-07-15'),
    (3,   'Chloe Martin',  'chloe@example.com',  'New Zealand', 'active',   27, '2023-01-09'),
    (4,   'Dmitri Petrov', 'dmitri@example.com', 'Estonia',     'inactive', 52, '2019-11-30'),
    (123, 'Eve Tanaka',    'eve@example.com',    'Japan',       'pending',  30, '2024-05-20');
SELECT setval('members_id_seq', 1000);
INSERT INTO fares (id, code, price) VALUES
    (1, 'NZL', 1.00),
    (2, 'AUS', 1.01);
"#;

pub async fn initialize_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA_SQL).execute(pool).await?;
    sqlx::raw_sql(SEED_SQL).execute(pool).await?;
    println!("✅ Database initialized with schema and seed data");
    Ok(())
}

// =============================================================================
// TEST CONTEXT
// =============================================================================

pub struct TestContext {
    pub admin: PgPool,
    pub store: PostgresStore,
}

impl TestContext {
    pub async fn setup() -> Result<Self, String> {
        start_postgres_container()?;
        let admin = wait_for_postgres().await?;
        let store = connect_store().await?;
        Ok(Self { admin, store })
    }

    /// Reset the members table to its seed state.
    pub async fn reset(&self) {
        initialize_database(&self.admin)
            .await
            .expect("Failed to initialize database");
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        stop_postgres_container();
        println!("🧹 Cleaned up PostgreSQL container");
    }
}

async fn connect_store() -> Result<PostgresStore, String> {
    let credentials = DatabaseCredentials::resolve(
        Some(database_url()),
        Some(POSTGRES_PASSWORD.to_string()),
    )
    .map_err(|e| e.to_string())?;
    PostgresStore::connect(&credentials, &DatabaseConfig::default())
        .await
        .map_err(|e| format!("Failed to connect store: {}", e))
}

// =============================================================================
// RESULT HELPERS
// =============================================================================

pub fn record(value: Value) -> Record {
    value.as_object().cloned().expect("record literal must be an object")
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    let mut ids: Vec<i64> = records.iter().filter_map(|r| r["id"].as_i64()).collect();
    ids.sort();
    ids
}

pub async fn count_rows(store: &PostgresStore) -> usize {
    store
        .select("members", "id", &[])
        .await
        .expect("count query should succeed")
        .len()
}
