//! PostgreSQL [`RecordStore`] for Rowgate.
//!
//! Connects with the configured service credential and runs each CRUD call
//! as a single statement built by [`statement::PgStatement`]. Filtered calls
//! first read the table's column types from the catalog so filter values can
//! be cast to them.

use async_trait::async_trait;
use rowgate_core::config::{DatabaseConfig, DatabaseCredentials, SslMode};
use rowgate_core::{BackendError, Filter, Record, RecordStore};
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgDatabaseError, PgPoolOptions, PgRow, PgSslMode};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use std::time::Duration;

pub mod statement;

pub use statement::{ColumnTypes, PgStatement};

/// Record store backed by a shared PostgreSQL pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Wrap an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool using the credentials and pool settings.
    ///
    /// The service key replaces any password embedded in the URL.
    pub async fn connect(
        credentials: &DatabaseCredentials,
        config: &DatabaseConfig,
    ) -> Result<Self, BackendError> {
        let mut options = PgConnectOptions::from_str(credentials.url())
            .map_err(backend_error)?
            .password(credentials.service_key());
        if let Some(mode) = config.ssl_mode {
            options = options.ssl_mode(pg_ssl_mode(mode));
        }

        let pool = PgPoolOptions::new()
            .min_connections(config.pool.min_connections)
            .max_connections(config.pool.max_connections)
            .acquire_timeout(Duration::from_secs(config.pool.acquire_timeout_seconds.into()))
            .idle_timeout(Duration::from_secs(config.pool.idle_timeout_seconds.into()))
            .connect_with(options)
            .await
            .map_err(backend_error)?;

        tracing::info!(
            max_connections = config.pool.max_connections,
            "Connected to PostgreSQL"
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Round-trip a trivial query.
    pub async fn ping(&self) -> Result<(), BackendError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(())
    }

    /// Base types of `table`'s columns, looked up only when filters need them.
    pub async fn column_types(
        &self,
        table: &str,
        filters: &[Filter],
    ) -> Result<ColumnTypes, BackendError> {
        if filters.is_empty() {
            return Ok(ColumnTypes::new());
        }
        let rows: Vec<(String, String)> = sqlx::query_as(statement::COLUMN_TYPES_SQL)
            .bind(statement::table_ident(table))
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;
        Ok(rows.into_iter().collect())
    }

    async fn fetch_records(&self, stmt: PgStatement) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(sql = stmt.sql(), "Executing statement");

        let mut builder = stmt.into_builder();
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(backend_error)?;

        rows.iter().map(row_to_record).collect()
    }
}

#[async_trait]
impl RecordStore for PostgresStore {
    async fn insert(&self, table: &str, records: &[Record]) -> Result<Vec<Record>, BackendError> {
        self.fetch_records(PgStatement::insert(table, records)).await
    }

    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Record>, BackendError> {
        let types = self.column_types(table, filters).await?;
        self.fetch_records(PgStatement::select(table, columns, filters, &types))
            .await
    }

    async fn update(
        &self,
        table: &str,
        changes: &Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, BackendError> {
        let types = self.column_types(table, filters).await?;
        self.fetch_records(PgStatement::update(table, changes, filters, &types))
            .await
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Record>, BackendError> {
        let types = self.column_types(table, filters).await?;
        self.fetch_records(PgStatement::delete(table, filters, &types))
            .await
    }
}

fn row_to_record(row: &PgRow) -> Result<Record, BackendError> {
    match row.try_get::<Value, _>("row").map_err(backend_error)? {
        Value::Object(record) => Ok(record),
        other => Err(BackendError::new(format!(
            "expected a JSON object per row, got {other}"
        ))),
    }
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Convert a driver error, keeping SQLSTATE, DETAIL and HINT when present.
pub fn backend_error(err: sqlx::Error) -> BackendError {
    match &err {
        sqlx::Error::Database(db) => {
            let mut converted = BackendError::new(db.message());
            if let Some(code) = db.code() {
                converted = converted.with_code(code);
            }
            if let Some(pg) = db.try_downcast_ref::<PgDatabaseError>() {
                if let Some(detail) = pg.detail() {
                    converted = converted.with_details(detail);
                }
                if let Some(hint) = pg.hint() {
                    converted = converted.with_hint(hint);
                }
            }
            converted
        }
        sqlx::Error::PoolTimedOut => {
            BackendError::new("timed out waiting for a database connection")
        }
        other => BackendError::new(other.to_string()),
    }
}
