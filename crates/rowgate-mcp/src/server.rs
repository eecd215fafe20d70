//! MCP tool server.
//!
//! Exposes the four CRUD tools through `rmcp`. Each tool deserializes its
//! arguments, hands them to the shared [`CrudExecutor`] and returns the
//! pretty-printed [`ToolResponse`] as text. Error responses are also flagged
//! `isError` so clients can tell them apart without parsing.

use crate::executor::CrudExecutor;
use crate::response::ToolResponse;
use rmcp::{
    ErrorData, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use rowgate_core::{FilterSpec, Record, RecordBatch};
use serde::Deserialize;
use std::sync::Arc;

/// Rowgate MCP server exposing table CRUD operations.
#[derive(Clone)]
pub struct RowgateMcpService {
    executor: Arc<CrudExecutor>,
    tool_router: ToolRouter<Self>,
}

impl RowgateMcpService {
    pub fn new(executor: Arc<CrudExecutor>) -> Self {
        Self {
            executor,
            tool_router: Self::tool_router(),
        }
    }

    pub fn executor(&self) -> &CrudExecutor {
        &self.executor
    }
}

// === Tool request types ===

/// Request to insert rows.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecordsRequest {
    /// Target table, optionally schema-qualified (e.g. "public.users")
    #[serde(alias = "table_name")]
    pub table: String,
    /// A single record object or an array of record objects
    #[serde(alias = "data")]
    pub records: RecordBatch,
}

/// Request to select rows.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ReadRowsRequest {
    /// Table to read from
    #[serde(alias = "table_name")]
    pub table: String,
    /// Comma-separated column list (default: "*")
    #[serde(default)]
    pub columns: Option<String>,
    /// Filters as [column, operator, value]; operators: eq, neq, gt, lt, gte, lte, like, in
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

/// Request to update rows.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecordsRequest {
    /// Table to update
    #[serde(alias = "table_name")]
    pub table: String,
    /// Column values to set on every matching row
    #[serde(alias = "data")]
    pub updates: Record,
    /// Filters selecting the rows to update; an empty list matches every row
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

/// Request to delete rows.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRecordsRequest {
    /// Table to delete from
    #[serde(alias = "table_name")]
    pub table: String,
    /// Filters selecting the rows to delete; an empty list matches every row
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

#[tool_router]
impl RowgateMcpService {
    #[tool(description = "Insert one record or an array of records into a table and return the created rows")]
    async fn create_records(
        &self,
        Parameters(req): Parameters<CreateRecordsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        to_call_result(self.executor.create_records(&req.table, req.records).await)
    }

    #[tool(description = "Read rows from a table, optionally selecting columns and filtering with [column, operator, value] tuples")]
    async fn read_rows(
        &self,
        Parameters(req): Parameters<ReadRowsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        to_call_result(
            self.executor
                .read_rows(&req.table, req.columns.as_deref(), &req.filters)
                .await,
        )
    }

    #[tool(description = "Update rows matching the filters with the given column values and return the updated rows")]
    async fn update_records(
        &self,
        Parameters(req): Parameters<UpdateRecordsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        to_call_result(
            self.executor
                .update_records(&req.table, &req.updates, &req.filters)
                .await,
        )
    }

    #[tool(description = "Delete rows matching the filters and return the deleted rows")]
    async fn delete_records(
        &self,
        Parameters(req): Parameters<DeleteRecordsRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        to_call_result(self.executor.delete_records(&req.table, &req.filters).await)
    }
}

#[tool_handler]
impl ServerHandler for RowgateMcpService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Rowgate database server. Create, read, update and delete rows in any table. \
                 Filters are [column, operator, value] tuples combined with AND; operators are \
                 eq, neq, gt, lt, gte, lte, like (with % wildcards) and in (with an array)."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Render a response as a text tool result.
pub fn to_call_result(response: ToolResponse) -> Result<CallToolResult, ErrorData> {
    let text = response
        .to_json_pretty()
        .map_err(|e| ErrorData::internal_error(format!("failed to serialize response: {e}"), None))?;
    let content = vec![Content::text(text)];
    if response.is_success() {
        Ok(CallToolResult::success(content))
    } else {
        Ok(CallToolResult::error(content))
    }
}
