//! Database Connection Management
//!
//! This module provides the database connection and initialization
//! functionality using libsql for TraceTree's tree payload storage.
//!
//! # Architecture
//!
//! - **Single table**: `trees` keyed by tree id, node graph kept as a JSON column
//! - **WAL mode**: Write-Ahead Logging so readers never block the importer
//! - **Scoped connections**: Every operation opens its own connection and drops
//!   it before returning, on success and on error
//!
//! # Database Connection Patterns
//!
//! Use `connect_with_timeout()` in async functions. It applies the configured
//! busy timeout so concurrent operations wait instead of failing with
//! `SQLITE_BUSY`.

use crate::config::StoreConfig;
use crate::db::error::DatabaseError;
use libsql::{Builder, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// Database service for managing libsql connection and schema
///
/// # Examples
///
/// ```no_run
/// use tracetree_core::config::StoreConfig;
/// use tracetree_core::db::DatabaseService;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let db_service = DatabaseService::new(&StoreConfig::new("data/tracetree.db")).await?;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseService {
    /// libsql database handle (wrapped in Arc for sharing)
    pub db: Arc<Database>,

    /// Path to the database file
    pub db_path: PathBuf,

    busy_timeout_ms: u32,
}

/// Parameters for tree upsert (avoids too-many-arguments lint)
pub struct DbUpsertTreeParams<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub root_node_id: &'a str,
    /// Serialized JSON of the node mapping
    pub nodes: &'a str,
}

impl DatabaseService {
    /// Open (or create) the database described by `config`
    ///
    /// This will:
    /// 1. Validate the configuration
    /// 2. Ensure the parent directory exists (create if needed)
    /// 3. Open/create the database file
    /// 4. Initialize the schema (CREATE TABLE IF NOT EXISTS)
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the configuration is invalid, the parent
    /// directory cannot be created, the connection fails or schema
    /// initialization fails.
    pub async fn new(config: &StoreConfig) -> Result<Self, DatabaseError> {
        config.validate().map_err(DatabaseError::InvalidConfig)?;
        let db_path = config.database_path.clone();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        DatabaseError::permission_denied(db_path.clone())
                    } else {
                        DatabaseError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;

        let service = Self {
            db: Arc::new(db),
            db_path,
            busy_timeout_ms: config.busy_timeout_ms,
        };

        service.initialize_schema().await?;
        tracing::debug!(path = %service.db_path.display(), "Tree store opened");

        Ok(service)
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so we must use query() instead of execute().
    async fn execute_pragma(
        &self,
        conn: &libsql::Connection,
        pragma: &str,
    ) -> Result<(), DatabaseError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    /// Initialize database schema and configuration
    ///
    /// Idempotent: safe to call on an existing database.
    async fn initialize_schema(&self) -> Result<(), DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL")
            .await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS trees (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                root_node_id TEXT NOT NULL,
                nodes JSON NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to create trees table: {}", e))
        })?;

        Ok(())
    }

    /// Get a raw connection to the database
    ///
    /// Prefer `connect_with_timeout()` in async code.
    pub fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        self.db.connect().map_err(DatabaseError::LibsqlError)
    }

    /// Get a connection with the configured busy timeout applied
    pub async fn connect_with_timeout(&self) -> Result<libsql::Connection, DatabaseError> {
        let conn = self.connect()?;

        self.execute_pragma(&conn, &format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms))
            .await?;

        Ok(conn)
    }

    //
    // TREE OPERATIONS
    //

    /// Retrieve a single tree row by id
    ///
    /// # Returns
    ///
    /// * `Ok(Some(row))` - columns `id, title, description, root_node_id, nodes, created_at, updated_at`
    /// * `Ok(None)` - no tree with this id
    /// * `Err(DatabaseError)` - query execution failed
    pub async fn db_get_tree(&self, id: &str) -> Result<Option<libsql::Row>, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, root_node_id, nodes, created_at, updated_at
                 FROM trees WHERE id = ?",
            )
            .await
            .map_err(|e| {
                DatabaseError::sql_execution(format!("Failed to prepare get_tree query: {}", e))
            })?;

        let mut rows = stmt.query([id]).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute get_tree query: {}", e))
        })?;

        rows.next()
            .await
            .map_err(|e| DatabaseError::sql_execution(e.to_string()))
    }

    /// Insert a tree or update the existing row with the same id
    ///
    /// An update only happens when at least one column differs, so
    /// re-importing identical data leaves the row (and `updated_at`) alone.
    ///
    /// # Returns
    ///
    /// Number of rows written: `1` for an insert or a real update, `0` when the
    /// stored row already matched.
    pub async fn db_upsert_tree(&self, params: DbUpsertTreeParams<'_>) -> Result<u64, DatabaseError> {
        let conn = self.connect_with_timeout().await?;

        conn.execute(
            "INSERT INTO trees (id, title, description, root_node_id, nodes)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                root_node_id = excluded.root_node_id,
                nodes = excluded.nodes,
                updated_at = CURRENT_TIMESTAMP
             WHERE trees.title IS NOT excluded.title
                OR trees.description IS NOT excluded.description
                OR trees.root_node_id IS NOT excluded.root_node_id
                OR trees.nodes IS NOT excluded.nodes",
            (
                params.id,
                params.title,
                params.description,
                params.root_node_id,
                params.nodes,
            ),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to upsert tree: {}", e)))
    }
}
