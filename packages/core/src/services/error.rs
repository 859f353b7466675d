//! Service Layer Error Types
//!
//! Errors returned by the tree retrieval path. "Not found" is a client-facing
//! outcome; everything else is a server-side fault.

use crate::db::DatabaseError;
use crate::models::{IntegrityIssue, SchemaValidationError};
use thiserror::Error;

/// Why a stored tree could not be served
#[derive(Error, Debug)]
pub enum IntegrityFault {
    /// The stored payload does not match the tree schema
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// A stored column could not be decoded at all
    #[error("{0}")]
    CorruptPayload(String),

    /// References do not resolve and the strict policy is active
    #[error("{} unresolved reference(s): {}", .0.len(), join_issues(.0))]
    UnresolvedReferences(Vec<IntegrityIssue>),
}

fn join_issues(issues: &[IntegrityIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Tree retrieval errors
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// No tree with this id exists in the store
    #[error("Tree not found: {id}")]
    NotFound { id: String },

    /// A stored tree violates the schema; the write path stored bad data
    #[error("Stored tree '{id}' failed validation: {fault}")]
    DataIntegrity { id: String, fault: IntegrityFault },

    /// The store itself failed
    #[error("Tree store failed: {0}")]
    Store(#[from] DatabaseError),
}

impl TreeServiceError {
    /// Create a not found error
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a data integrity error
    pub fn data_integrity(id: impl Into<String>, fault: impl Into<IntegrityFault>) -> Self {
        Self::DataIntegrity {
            id: id.into(),
            fault: fault.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
