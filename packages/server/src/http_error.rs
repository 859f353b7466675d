//! HTTP error handling
//!
//! Every failed request answers with a JSON body carrying a human readable
//! `detail` and a machine readable `code`; the code decides the status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracetree_core::TreeServiceError;

pub const TREE_NOT_FOUND: &str = "TREE_NOT_FOUND";
pub const DATA_INTEGRITY: &str = "DATA_INTEGRITY";
pub const STORE_ERROR: &str = "STORE_ERROR";
pub const SERIALIZATION_ERROR: &str = "SERIALIZATION_ERROR";

/// HTTP error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct HttpError {
    /// User-facing error message
    pub detail: String,
    /// Machine-readable error code
    pub code: String,
}

impl HttpError {
    pub fn new(detail: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            code: code.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            TREE_NOT_FOUND => StatusCode::NOT_FOUND,
            STORE_ERROR => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<TreeServiceError> for HttpError {
    fn from(err: TreeServiceError) -> Self {
        match err {
            TreeServiceError::NotFound { .. } => HttpError::new(err.to_string(), TREE_NOT_FOUND),
            // Details were logged by the service; keep stored data out of the response
            TreeServiceError::DataIntegrity { id, .. } => HttpError::new(
                format!("Stored tree '{}' is invalid", id),
                DATA_INTEGRITY,
            ),
            TreeServiceError::Store(_) => {
                HttpError::new("Tree store is unavailable", STORE_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracetree_core::{DatabaseError, IntegrityFault};

    #[test]
    fn test_not_found_maps_to_404_with_detail() {
        let err = HttpError::from(TreeServiceError::not_found("unknown-tree"));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.detail, "Tree not found: unknown-tree");
    }

    #[test]
    fn test_data_integrity_maps_to_500() {
        let err = HttpError::from(TreeServiceError::data_integrity(
            "t1",
            IntegrityFault::CorruptPayload("nodes: bad".to_string()),
        ));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, DATA_INTEGRITY);
        assert!(!err.detail.contains("nodes: bad"));
    }

    #[test]
    fn test_store_failure_maps_to_503() {
        let err = HttpError::from(TreeServiceError::Store(DatabaseError::sql_execution("locked")));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
