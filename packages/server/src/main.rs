//! TraceTree HTTP Server Binary
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (127.0.0.1:8000, data/tracetree.db)
//! cargo run --bin tracetree-server
//!
//! # Custom port and database
//! TRACETREE_PORT=9000 TRACETREE_DATABASE_PATH=/srv/trees.db cargo run --bin tracetree-server
//! ```
//!
//! # Environment Variables
//!
//! - `TRACETREE_*`: see [`AppConfig`](tracetree_server::AppConfig)
//! - `RUST_LOG`: Logging filter (overrides `TRACETREE_DEBUG`)

use tracetree_server::{start_server, AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config.app_name, env!("CARGO_PKG_VERSION"));

    start_server(config).await
}
