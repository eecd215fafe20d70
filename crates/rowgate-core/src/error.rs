//! Error types shared across Rowgate crates.

use thiserror::Error;

/// A filter named an operator outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Unsupported filter operator: {operator} (column '{column}'); expected one of eq, neq, gt, lt, gte, lte, like, in"
)]
pub struct UnsupportedOperatorError {
    pub operator: String,
    pub column: String,
}

/// A fault reported by the database backend.
///
/// Carries the backend's own message plus whatever structured detail it
/// supplied. Never contains connection credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    /// Backend error code (SQLSTATE for PostgreSQL).
    pub code: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
