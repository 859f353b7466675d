//! Batch Tree Import Binary
//!
//! Loads every `*.json` tree document from a directory into the tree store,
//! creating or updating rows by tree id.
//!
//! # Usage
//!
//! ```bash
//! # Import data/trees into the configured database
//! cargo run --bin import-trees
//!
//! # Import another directory
//! cargo run --bin import-trees -- ./exports/trees
//! ```
//!
//! # Environment Variables
//!
//! - `TRACETREE_IMPORT_DIR`: Directory to import when no argument is given
//!   (default: `data/trees`)
//! - `TRACETREE_DATABASE_PATH`, `TRACETREE_BUSY_TIMEOUT_MS`: target store
//! - `RUST_LOG`: Logging filter

use std::path::PathBuf;
use std::sync::Arc;

use tracetree_core::import::TreeImporter;
use tracetree_core::DatabaseService;
use tracetree_server::AppConfig;

const DEFAULT_IMPORT_DIR: &str = "data/trees";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.default_log_filter())),
        )
        .init();

    let dir: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TRACETREE_IMPORT_DIR").ok())
        .unwrap_or_else(|| DEFAULT_IMPORT_DIR.to_string())
        .into();

    tracing::info!(
        source = %dir.display(),
        database = %config.store.database_path.display(),
        "Importing trees"
    );

    let db = Arc::new(DatabaseService::new(&config.store).await?);
    let report = TreeImporter::new(db).import_dir(&dir).await?;

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        unchanged = report.unchanged.len(),
        failed = report.failures.len(),
        "Import finished"
    );

    if report.has_failures() {
        for failure in &report.failures {
            tracing::error!(path = %failure.path.display(), error = %failure.error, "Not imported");
        }
        anyhow::bail!("{} file(s) failed to import", report.failures.len());
    }

    Ok(())
}
