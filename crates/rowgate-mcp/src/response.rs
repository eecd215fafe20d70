//! Structured tool responses.
//!
//! Every handler returns a [`ToolResponse`], success or failure, so callers
//! always receive a JSON object naming the operation and table.

use crate::error::CrudError;
use rowgate_core::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The CRUD operation a response belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Read => "read",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Result of a CRUD tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub status: Status,
    pub operation: Operation,
    pub table: String,

    /// Rows returned by the backend. Present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Record>>,

    /// Number of rows in `data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,

    /// Human-readable failure description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Backend error code (SQLSTATE).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ToolResponse {
    pub fn success(operation: Operation, table: impl Into<String>, data: Vec<Record>) -> Self {
        Self {
            status: Status::Success,
            operation,
            table: table.into(),
            count: Some(data.len()),
            data: Some(data),
            message: None,
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn error(operation: Operation, table: impl Into<String>, err: &CrudError) -> Self {
        let mut response = Self {
            status: Status::Error,
            operation,
            table: table.into(),
            data: None,
            count: None,
            message: Some(err.to_string()),
            code: None,
            details: None,
            hint: None,
        };
        if let CrudError::Backend(backend) = err {
            response.code = backend.code.clone();
            response.details = backend.details.clone();
            response.hint = backend.hint.clone();
        }
        response
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Rows returned on success; empty for an error.
    pub fn rows(&self) -> &[Record] {
        self.data.as_deref().unwrap_or_default()
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
