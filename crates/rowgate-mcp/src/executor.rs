//! CRUD tool execution.
//!
//! [`CrudExecutor`] is the shared context every tool call runs through. It
//! validates the few structural requirements a call has, translates filters,
//! runs exactly one backend statement and folds the outcome, success or
//! failure, into a [`ToolResponse`]. Nothing here retries or caches.

use crate::error::CrudError;
use crate::response::{Operation, ToolResponse};
use rowgate_core::{Filter, FilterSpec, Record, RecordBatch, RecordStore, parse_filters};
use std::sync::Arc;

/// Column selection used when none is given.
pub const ALL_COLUMNS: &str = "*";

/// Runs CRUD operations against a [`RecordStore`].
#[derive(Clone)]
pub struct CrudExecutor {
    store: Arc<dyn RecordStore>,
    require_mutation_filters: bool,
}

impl CrudExecutor {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            require_mutation_filters: false,
        }
    }

    /// Reject updates and deletes that carry no filters.
    pub fn with_require_mutation_filters(mut self, require: bool) -> Self {
        self.require_mutation_filters = require;
        self
    }

    pub fn requires_mutation_filters(&self) -> bool {
        self.require_mutation_filters
    }

    /// Insert one record or a batch in a single statement.
    ///
    /// An empty batch succeeds without touching the database.
    pub async fn create_records(&self, table: &str, records: RecordBatch) -> ToolResponse {
        tracing::info!(operation = "create", table, records = records.len(), "Tool call");

        let result = self.try_create(table, records).await;
        respond(Operation::Create, table, result)
    }

    /// Select rows, optionally restricted to `columns` and filtered.
    pub async fn read_rows(
        &self,
        table: &str,
        columns: Option<&str>,
        filters: &[FilterSpec],
    ) -> ToolResponse {
        let columns = match columns.map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => ALL_COLUMNS,
        };
        tracing::info!(operation = "read", table, columns, filters = filters.len(), "Tool call");

        let result = self.try_read(table, columns, filters).await;
        respond(Operation::Read, table, result)
    }

    /// Apply `updates` to every row matching `filters`.
    pub async fn update_records(
        &self,
        table: &str,
        updates: &Record,
        filters: &[FilterSpec],
    ) -> ToolResponse {
        tracing::info!(operation = "update", table, filters = filters.len(), "Tool call");

        let result = self.try_update(table, updates, filters).await;
        respond(Operation::Update, table, result)
    }

    /// Delete every row matching `filters`.
    pub async fn delete_records(&self, table: &str, filters: &[FilterSpec]) -> ToolResponse {
        tracing::info!(operation = "delete", table, filters = filters.len(), "Tool call");

        let result = self.try_delete(table, filters).await;
        respond(Operation::Delete, table, result)
    }

    async fn try_create(&self, table: &str, records: RecordBatch) -> Result<Vec<Record>, CrudError> {
        require_table(table)?;
        let records = records.into_vec();
        if records.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.insert(table, &records).await?)
    }

    async fn try_read(
        &self,
        table: &str,
        columns: &str,
        specs: &[FilterSpec],
    ) -> Result<Vec<Record>, CrudError> {
        require_table(table)?;
        let filters = parse_filters(specs)?;
        Ok(self.store.select(table, columns, &filters).await?)
    }

    async fn try_update(
        &self,
        table: &str,
        updates: &Record,
        specs: &[FilterSpec],
    ) -> Result<Vec<Record>, CrudError> {
        require_table(table)?;
        if updates.is_empty() {
            return Err(CrudError::invalid("update payload must set at least one column"));
        }
        let filters = self.mutation_filters(Operation::Update, table, specs)?;
        Ok(self.store.update(table, updates, &filters).await?)
    }

    async fn try_delete(&self, table: &str, specs: &[FilterSpec]) -> Result<Vec<Record>, CrudError> {
        require_table(table)?;
        let filters = self.mutation_filters(Operation::Delete, table, specs)?;
        Ok(self.store.delete(table, &filters).await?)
    }

    fn mutation_filters(
        &self,
        operation: Operation,
        table: &str,
        specs: &[FilterSpec],
    ) -> Result<Vec<Filter>, CrudError> {
        let filters = parse_filters(specs)?;
        if filters.is_empty() {
            if self.require_mutation_filters {
                return Err(CrudError::invalid(format!(
                    "{operation} without filters would affect every row of '{table}'; \
                     add at least one filter"
                )));
            }
            tracing::warn!(operation = operation.as_str(), table, "Unfiltered mutation affects every row");
        }
        Ok(filters)
    }
}

fn require_table(table: &str) -> Result<(), CrudError> {
    if table.trim().is_empty() {
        return Err(CrudError::invalid("table name must not be empty"));
    }
    Ok(())
}

fn respond(
    operation: Operation,
    table: &str,
    result: Result<Vec<Record>, CrudError>,
) -> ToolResponse {
    match result {
        Ok(rows) => {
            tracing::debug!(operation = operation.as_str(), table, rows = rows.len(), "Tool call succeeded");
            ToolResponse::success(operation, table, rows)
        }
        Err(err) => {
            tracing::warn!(operation = operation.as_str(), table, error = %err, "Tool call failed");
            ToolResponse::error(operation, table, &err)
        }
    }
}
