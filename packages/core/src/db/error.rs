//! Tree Store Errors
//!
//! Everything that can go wrong between a `StoreConfig` and a decoded
//! `trees` row. Opening the file, creating the table and running a lookup or
//! upsert all report through [`DatabaseError`].

use std::path::PathBuf;
use thiserror::Error;

/// Failure inside the libsql tree store
///
/// `CorruptRecord` is the only variant about stored data rather than the
/// store itself; the retrieval service turns it into a data-integrity fault.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The tree database file could not be opened
    #[error("Failed to open tree database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// WAL setup or `trees` table creation failed
    #[error("Failed to prepare tree database: {0}")]
    InitializationFailed(String),

    /// `StoreConfig::validate` refused the configuration
    #[error("Invalid store configuration: {0}")]
    InvalidConfig(String),

    #[error("Permission denied for tree database path: {path}")]
    PermissionDenied { path: PathBuf },

    /// The directory meant to hold the database could not be created
    #[error("Failed to create directory for tree database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// Raw libsql failure with no extra context (e.g. opening a connection)
    #[error("Tree database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// A tree query or upsert failed; `context` names the statement
    #[error("Tree query failed: {context}")]
    SqlExecutionError { context: String },

    /// A `trees` row exists but a column cannot be decoded
    #[error("Stored tree '{id}' is corrupt: {reason}")]
    CorruptRecord { id: String, reason: String },
}

impl DatabaseError {
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    /// `reason` is prefixed with the failing column, e.g. `nodes: expected value`
    pub fn corrupt_record(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
