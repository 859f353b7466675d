//! Batch Tree Import
//!
//! One-way loader that reads tree documents (JSON files) and upserts them
//! into the database by tree id. This is the only write path.
//!
//! Documents are validated before they are stored, so a shape error is caught
//! here instead of on the read path. Unresolved references are logged but do
//! not block the import. Re-importing identical data leaves the row untouched.

use crate::db::{DatabaseError, DatabaseService, DbUpsertTreeParams};
use crate::models::{check_referential_integrity, validate, SchemaValidationError};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Import errors
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Document rejected: {0}")]
    Invalid(#[from] SchemaValidationError),

    #[error("Failed to serialize nodes: {0}")]
    Serialization(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// What happened to one imported tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    /// No row existed for this id
    Created,
    /// The existing row differed and was overwritten
    Updated,
    /// The existing row already held identical data
    Unchanged,
}

/// A file that could not be imported
#[derive(Debug)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: ImportError,
}

/// Summary of a directory import
#[derive(Debug, Default)]
pub struct ImportReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub failures: Vec<ImportFailure>,
}

impl ImportReport {
    /// Number of trees written or confirmed in the store
    pub fn imported(&self) -> usize {
        self.created.len() + self.updated.len() + self.unchanged.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn record(&mut self, id: String, outcome: ImportOutcome) {
        match outcome {
            ImportOutcome::Created => self.created.push(id),
            ImportOutcome::Updated => self.updated.push(id),
            ImportOutcome::Unchanged => self.unchanged.push(id),
        }
    }
}

/// Loads tree documents into the database
pub struct TreeImporter {
    db: Arc<DatabaseService>,
}

impl TreeImporter {
    pub fn new(db: Arc<DatabaseService>) -> Self {
        Self { db }
    }

    /// Validate one document and upsert it
    ///
    /// The stored `nodes` column is the document's own `nodes` value; fields
    /// the schema does not know about are kept as authored.
    ///
    /// # Returns
    ///
    /// The tree id and whether the row was created, updated or left unchanged.
    pub async fn import_document(
        &self,
        document: &Value,
    ) -> Result<(String, ImportOutcome), ImportError> {
        let tree = validate(document)?;

        if let Err(issues) = check_referential_integrity(&tree) {
            for issue in &issues {
                tracing::warn!(
                    tree_id = %tree.id,
                    %issue,
                    "Imported tree has an unresolved reference"
                );
            }
        }

        let nodes = serde_json::to_string(&document["nodes"])
            .map_err(|e| ImportError::Serialization(e.to_string()))?;

        let existed = self.db.db_get_tree(&tree.id).await?.is_some();
        let written = self
            .db
            .db_upsert_tree(DbUpsertTreeParams {
                id: &tree.id,
                title: &tree.title,
                description: Some(tree.description.as_str()),
                root_node_id: &tree.root_node_id,
                nodes: &nodes,
            })
            .await?;

        let outcome = match (existed, written) {
            (false, _) => ImportOutcome::Created,
            (true, 0) => ImportOutcome::Unchanged,
            (true, _) => ImportOutcome::Updated,
        };
        tracing::info!(tree_id = %tree.id, title = %tree.title, ?outcome, "Tree imported");

        Ok((tree.id, outcome))
    }

    /// Read, parse and import a single JSON file
    pub async fn import_file(&self, path: &Path) -> Result<(String, ImportOutcome), ImportError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ImportError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let document: Value = serde_json::from_str(&text).map_err(|source| ImportError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        self.import_document(&document).await
    }

    /// Import every `*.json` file directly inside `dir`, in file name order
    ///
    /// A failing file is recorded in the report and the import moves on.
    ///
    /// # Errors
    ///
    /// Only fails if the directory itself cannot be listed.
    pub async fn import_dir(&self, dir: &Path) -> Result<ImportReport, ImportError> {
        let files = json_files(dir).await?;
        let mut report = ImportReport::default();

        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "No JSON files found");
            return Ok(report);
        }

        tracing::info!(dir = %dir.display(), count = files.len(), "Importing tree files");

        for path in files {
            match self.import_file(&path).await {
                Ok((id, outcome)) => report.record(id, outcome),
                Err(error) => {
                    tracing::error!(path = %path.display(), %error, "Tree import failed");
                    report.failures.push(ImportFailure { path, error });
                }
            }
        }

        Ok(report)
    }
}

async fn json_files(dir: &Path) -> Result<Vec<PathBuf>, ImportError> {
    let io_err = |source| ImportError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        let is_file = entry.file_type().await.map_err(io_err)?.is_file();
        if is_file && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
