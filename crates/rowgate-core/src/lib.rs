//! # rowgate-core
//!
//! Shared types for Rowgate: the filter model and its translator, row
//! payloads, the [`RecordStore`] backend seam, errors and configuration.

// Configuration types shared across all Rowgate crates
pub mod config;

pub mod error;
pub mod filter;
pub mod record;
pub mod store;

pub use config::{
    ConfigError, ConnectionPoolConfig, DatabaseConfig, DatabaseCredentials, GuardrailsConfig,
    RowgateConfig, SslMode,
};
pub use error::{BackendError, UnsupportedOperatorError};
pub use filter::{Filter, FilterBuilder, FilterOp, FilterSpec, apply_filters, parse_filters};
pub use record::{Record, RecordBatch};
pub use store::RecordStore;
