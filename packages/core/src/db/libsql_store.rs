//! LibsqlTreeStore - TreeStore Implementation for the libsql Backend
//!
//! Thin wrapper around [`DatabaseService`] that converts `trees` rows into
//! [`TreeRecord`]s. No business logic lives here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use tracetree_core::config::StoreConfig;
//! use tracetree_core::db::{DatabaseService, LibsqlTreeStore, TreeStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let db = Arc::new(DatabaseService::new(&StoreConfig::default()).await?);
//!     let store: Arc<dyn TreeStore> = Arc::new(LibsqlTreeStore::new(db));
//!
//!     let record = store.find_by_id("nmap-basics-linux").await?;
//!     Ok(())
//! }
//! ```

use crate::db::tree_store::{TreeRecord, TreeStore};
use crate::db::{DatabaseError, DatabaseService};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use libsql::Row;
use std::sync::Arc;

/// LibsqlTreeStore implements TreeStore for the libsql backend
pub struct LibsqlTreeStore {
    db: Arc<DatabaseService>,
}

impl LibsqlTreeStore {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Parse timestamp from database - handles both SQLite and RFC3339 formats
    ///
    /// SQLite CURRENT_TIMESTAMP returns: "YYYY-MM-DD HH:MM:SS"
    fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
            return Some(naive.and_utc());
        }

        DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Convert a `trees` row to a TreeRecord
    ///
    /// Expected columns (in order): id, title, description, root_node_id,
    /// nodes (JSON text), created_at, updated_at.
    fn row_to_record(row: &Row) -> Result<TreeRecord, DatabaseError> {
        let id: String = row.get(0)?;
        let corrupt = |column: &str, reason: String| {
            DatabaseError::corrupt_record(id.clone(), format!("{}: {}", column, reason))
        };

        let title: String = row.get(1).map_err(|e| corrupt("title", e.to_string()))?;
        let description: Option<String> = row
            .get(2)
            .map_err(|e| corrupt("description", e.to_string()))?;
        let root_node_id: String = row
            .get(3)
            .map_err(|e| corrupt("root_node_id", e.to_string()))?;
        let nodes_json: String = row.get(4).map_err(|e| corrupt("nodes", e.to_string()))?;
        let nodes: serde_json::Value =
            serde_json::from_str(&nodes_json).map_err(|e| corrupt("nodes", e.to_string()))?;

        let created_at: Option<String> = row
            .get(5)
            .map_err(|e| corrupt("created_at", e.to_string()))?;
        let updated_at: Option<String> = row
            .get(6)
            .map_err(|e| corrupt("updated_at", e.to_string()))?;

        Ok(TreeRecord {
            id,
            title,
            description,
            root_node_id,
            nodes,
            created_at: created_at.as_deref().and_then(Self::parse_timestamp),
            updated_at: updated_at.as_deref().and_then(Self::parse_timestamp),
        })
    }
}

#[async_trait]
impl TreeStore for LibsqlTreeStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<TreeRecord>, DatabaseError> {
        match self.db.db_get_tree(id).await? {
            Some(row) => Self::row_to_record(&row).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::db::DbUpsertTreeParams;
    use serde_json::json;
    use tempfile::TempDir;

    async fn store(temp_dir: &TempDir) -> (Arc<DatabaseService>, LibsqlTreeStore) {
        let config = StoreConfig::new(temp_dir.path().join("trees.db"));
        let db = Arc::new(DatabaseService::new(&config).await.unwrap());
        (db.clone(), LibsqlTreeStore::new(db))
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let sqlite = LibsqlTreeStore::parse_timestamp("2025-01-03 10:20:30").unwrap();
        let rfc = LibsqlTreeStore::parse_timestamp("2025-01-03T10:20:30Z").unwrap();
        assert_eq!(sqlite, rfc);
        assert!(LibsqlTreeStore::parse_timestamp("yesterday").is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_decodes_row() {
        let temp_dir = TempDir::new().unwrap();
        let (db, store) = store(&temp_dir).await;

        db.db_upsert_tree(DbUpsertTreeParams {
            id: "t1",
            title: "Tree",
            description: None,
            root_node_id: "root",
            nodes: r#"{"root":{"id":"root"}}"#,
        })
        .await
        .unwrap();

        let record = store.find_by_id("t1").await.unwrap().unwrap();
        assert_eq!(record.title, "Tree");
        assert_eq!(record.description, None);
        assert_eq!(record.nodes, json!({"root": {"id": "root"}}));
        assert!(record.created_at.is_some());
        assert!(record.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_find_by_id_missing() {
        let temp_dir = TempDir::new().unwrap();
        let (_db, store) = store(&temp_dir).await;

        assert!(store.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unparsable_nodes_column_is_corrupt_record() {
        let temp_dir = TempDir::new().unwrap();
        let (db, store) = store(&temp_dir).await;

        db.db_upsert_tree(DbUpsertTreeParams {
            id: "broken",
            title: "Broken",
            description: Some("bad payload"),
            root_node_id: "root",
            nodes: "{not json",
        })
        .await
        .unwrap();

        let err = store.find_by_id("broken").await.unwrap_err();
        assert!(matches!(err, DatabaseError::CorruptRecord { ref id, .. } if id == "broken"));
    }
}
