//! # rowgate-mcp
//!
//! CRUD tool handlers and the MCP server that exposes them.
//!
//! | Tool | Arguments | Returns |
//! |------|-----------|---------|
//! | `create_records` | `table`, `records` | created rows |
//! | `read_rows` | `table`, `columns?`, `filters?` | matching rows |
//! | `update_records` | `table`, `updates`, `filters?` | updated rows |
//! | `delete_records` | `table`, `filters?` | deleted rows |
//!
//! Every tool answers with a JSON object carrying `status`, `operation` and
//! `table`, plus either `data`/`count` or `message` and any backend error
//! detail.
//!
//! ```ignore
//! use rowgate_mcp::{CrudExecutor, RowgateMcpService};
//! use rmcp::{ServiceExt, transport::stdio};
//!
//! let executor = Arc::new(CrudExecutor::new(Arc::new(store)));
//! let service = RowgateMcpService::new(executor).serve(stdio()).await?;
//! service.waiting().await?;
//! ```

pub mod error;
pub mod executor;
pub mod response;
pub mod server;

pub use error::CrudError;
pub use executor::CrudExecutor;
pub use response::{Operation, Status, ToolResponse};
pub use server::RowgateMcpService;
