//! Tree Endpoints
//!
//! # Endpoints
//!
//! - `GET /` - Liveness check, never touches the store
//! - `GET /trees/:id` - Full validated tree
//! - `GET /api/trees/:id` - Same handler under the `/api` prefix

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::http_error::{HttpError, SERIALIZATION_ERROR};
use crate::AppState;

/// Liveness response
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub message: String,
    pub version: String,
}

/// Health check endpoint
///
/// ```bash
/// curl http://localhost:8000/
/// ```
async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        message: format!("{} is running", state.app_name),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Get a tree by id
///
/// ```bash
/// curl http://localhost:8000/trees/nmap-basics-linux
/// ```
async fn get_tree(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, HttpError> {
    let tree = state.tree_service.get_tree(&id).await?;

    let body = tree.to_transport().map_err(|e| {
        tracing::error!(tree_id = %id, error = %e, "Failed to serialize tree");
        HttpError::new("Failed to serialize tree", SERIALIZATION_ERROR)
    })?;

    Ok(Json(body))
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/trees/:id", get(get_tree))
        .route("/api/trees/:id", get(get_tree))
        .with_state(state)
}
