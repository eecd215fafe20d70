use crate::error::BackendError;
use crate::filter::Filter;
use crate::record::Record;
use async_trait::async_trait;

/// Table-scoped access to the database backend.
///
/// Filters reach the store already validated. Implementations run one
/// statement per call and return the rows the backend reports.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert all records in a single statement and return them as stored.
    async fn insert(&self, table: &str, records: &[Record]) -> Result<Vec<Record>, BackendError>;

    /// Select `columns` (`*` or a comma-separated list) from rows matching `filters`.
    async fn select(
        &self,
        table: &str,
        columns: &str,
        filters: &[Filter],
    ) -> Result<Vec<Record>, BackendError>;

    /// Apply `changes` to rows matching `filters` and return the updated rows.
    async fn update(
        &self,
        table: &str,
        changes: &Record,
        filters: &[Filter],
    ) -> Result<Vec<Record>, BackendError>;

    /// Delete rows matching `filters` and return them.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<Vec<Record>, BackendError>;
}
