//! Error types for the CRUD handlers.

use rowgate_core::{BackendError, UnsupportedOperatorError};
use thiserror::Error;

/// Errors a CRUD handler can report back to the caller.
#[derive(Debug, Error)]
pub enum CrudError {
    /// The call was structurally invalid and never reached the database.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A filter named an operator outside the supported set.
    #[error(transparent)]
    UnsupportedOperator(#[from] UnsupportedOperatorError),

    /// The database rejected or failed the statement.
    #[error("Database error: {0}")]
    Backend(#[from] BackendError),
}

impl CrudError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        CrudError::InvalidArguments(reason.into())
    }
}
