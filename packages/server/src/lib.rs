//! TraceTree HTTP server
//!
//! Exposes validated decision trees over a small read-only REST API.
//!
//! # Architecture
//!
//! - `tree_endpoints`: health check and tree lookup routes
//! - `http_error`: JSON error bodies and status mapping
//! - `config`: environment-driven [`AppConfig`]
//!
//! State is an `Arc<TreeService>` shared by every request. Each lookup opens
//! its own store connection, so requests never wait on each other.

use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tracetree_core::{DatabaseService, LibsqlTreeStore, TreeService};

pub mod config;
mod http_error;
mod tree_endpoints;

pub use config::{AppConfig, ConfigError, CorsOrigins};
pub use http_error::HttpError;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub tree_service: Arc<TreeService>,
    pub app_name: Arc<str>,
}

impl AppState {
    pub fn new(tree_service: Arc<TreeService>, app_name: impl Into<Arc<str>>) -> Self {
        Self {
            tree_service,
            app_name: app_name.into(),
        }
    }
}

/// Create the application router with tracing and CORS layers
pub fn create_router(state: AppState, cors_origins: &CorsOrigins) -> Router {
    tree_endpoints::routes(state)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// Create CORS layer
///
/// Read-only API: only GET (and preflight OPTIONS) are allowed. Origins that
/// are not valid header values are skipped with a warning.
fn cors_layer(origins: &CorsOrigins) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    match origins {
        CorsOrigins::Any => layer.allow_origin(Any),
        CorsOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(%origin, "Ignoring invalid CORS origin");
                        None
                    }
                })
                .collect();
            layer.allow_origin(values)
        }
    }
}

/// Open the store described by `config` and build the tree service on it
pub async fn build_service(config: &AppConfig) -> anyhow::Result<Arc<TreeService>> {
    let db = Arc::new(DatabaseService::new(&config.store).await?);
    let store = Arc::new(LibsqlTreeStore::new(db));

    Ok(Arc::new(TreeService::with_policy(
        store,
        config.reference_policy,
    )))
}

/// Start the HTTP server and serve until the process is stopped
///
/// # Errors
///
/// Returns error if the store cannot be opened or the server fails to bind.
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let tree_service = build_service(&config).await?;
    tracing::info!(
        database = %config.store.database_path.display(),
        policy = ?config.reference_policy,
        "Tree store ready"
    );

    let state = AppState::new(tree_service, config.app_name.as_str());
    let app = create_router(state, &config.cors_origins);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("{} listening on http://{}", config.app_name, addr);

    axum::serve(listener, app).await?;

    Ok(())
}
