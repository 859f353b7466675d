//! Tree Retrieval Service
//!
//! Orchestrates a single-key lookup: fetch the raw record from the
//! [`TreeStore`], validate it, and hand back a [`Tree`] or a clear error.
//!
//! # Guarantees
//!
//! - An absent id always yields [`TreeServiceError::NotFound`]
//! - A stored record that fails validation yields
//!   [`TreeServiceError::DataIntegrity`], is logged, and is never repaired
//! - No caching: every call reads the store again and keeps nothing afterwards

use crate::db::{DatabaseError, TreeStore};
use crate::models::{check_referential_integrity, validate, Tree};
use crate::services::error::{IntegrityFault, TreeServiceError};
use std::sync::Arc;
use tracing::instrument;

/// What to do when a structurally valid tree has unresolved references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferencePolicy {
    /// Log each issue as a warning and serve the tree unmodified
    #[default]
    Lenient,
    /// Refuse to serve the tree; report it as a data-integrity fault
    Strict,
}

/// Read-only tree retrieval over a shared store
///
/// Cheap to share behind an `Arc`; it holds no per-request state.
pub struct TreeService {
    store: Arc<dyn TreeStore>,
    reference_policy: ReferencePolicy,
}

impl TreeService {
    /// Create a service with the lenient reference policy
    pub fn new(store: Arc<dyn TreeStore>) -> Self {
        Self::with_policy(store, ReferencePolicy::default())
    }

    pub fn with_policy(store: Arc<dyn TreeStore>, reference_policy: ReferencePolicy) -> Self {
        Self {
            store,
            reference_policy,
        }
    }

    pub fn reference_policy(&self) -> ReferencePolicy {
        self.reference_policy
    }

    /// Fetch and validate the tree stored under `id`
    ///
    /// # Errors
    ///
    /// - `NotFound` if the store has no record for `id` (or `id` is empty)
    /// - `DataIntegrity` if the stored record fails validation, or has
    ///   unresolved references under [`ReferencePolicy::Strict`]
    /// - `Store` if the lookup itself fails
    #[instrument(skip(self))]
    pub async fn get_tree(&self, id: &str) -> Result<Tree, TreeServiceError> {
        if id.is_empty() {
            return Err(TreeServiceError::not_found(id));
        }

        let record = match self.store.find_by_id(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!("Tree not found");
                return Err(TreeServiceError::not_found(id));
            }
            Err(DatabaseError::CorruptRecord { reason, .. }) => {
                tracing::error!(%reason, "Stored tree record could not be decoded");
                return Err(TreeServiceError::data_integrity(
                    id,
                    IntegrityFault::CorruptPayload(reason),
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "Tree store lookup failed");
                return Err(e.into());
            }
        };

        let tree = validate(&record.to_payload()).map_err(|e| {
            tracing::error!(
                path = %e.path,
                expected = %e.expected,
                actual = %e.actual,
                "Stored tree violates the schema"
            );
            TreeServiceError::data_integrity(id, e)
        })?;

        if let Err(issues) = check_referential_integrity(&tree) {
            match self.reference_policy {
                ReferencePolicy::Lenient => {
                    for issue in &issues {
                        tracing::warn!(%issue, "Stored tree has an unresolved reference");
                    }
                }
                ReferencePolicy::Strict => {
                    tracing::error!(count = issues.len(), "Stored tree has unresolved references");
                    return Err(TreeServiceError::data_integrity(
                        id,
                        IntegrityFault::UnresolvedReferences(issues),
                    ));
                }
            }
        }

        tracing::debug!(nodes = tree.nodes.len(), "Tree served");
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::TreeRecord;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    /// In-memory store keyed by id
    #[derive(Default)]
    struct MemoryStore {
        records: HashMap<String, TreeRecord>,
    }

    impl MemoryStore {
        fn with(mut self, id: &str, description: Option<&str>, root: &str, nodes: Value) -> Self {
            self.records.insert(
                id.to_string(),
                TreeRecord {
                    id: id.to_string(),
                    title: format!("Title of {}", id),
                    description: description.map(str::to_string),
                    root_node_id: root.to_string(),
                    nodes,
                    created_at: None,
                    updated_at: None,
                },
            );
            self
        }
    }

    #[async_trait]
    impl TreeStore for MemoryStore {
        async fn find_by_id(&self, id: &str) -> Result<Option<TreeRecord>, DatabaseError> {
            Ok(self.records.get(id).cloned())
        }
    }

    /// Store whose every lookup fails
    struct FailingStore(fn() -> DatabaseError);

    #[async_trait]
    impl TreeStore for FailingStore {
        async fn find_by_id(&self, _id: &str) -> Result<Option<TreeRecord>, DatabaseError> {
            Err((self.0)())
        }
    }

    fn linux_nodes() -> Value {
        json!({
            "linux-root": {
                "id": "linux-root",
                "question": "Run an nmap scan",
                "type": "select",
                "options": [{"id": "opt-1", "label": "dummy", "next_node_ids": []}]
            }
        })
    }

    fn dangling_nodes() -> Value {
        json!({
            "start": {
                "id": "start",
                "question": "Pick one",
                "type": "select",
                "options": [{"id": "go", "label": "Go", "next_node_ids": ["nowhere"]}]
            }
        })
    }

    fn service(store: MemoryStore, policy: ReferencePolicy) -> TreeService {
        TreeService::with_policy(Arc::new(store), policy)
    }

    #[tokio::test]
    async fn test_get_tree_success() {
        let store = MemoryStore::default().with(
            "nmap-basics-linux",
            Some("desc"),
            "linux-root",
            linux_nodes(),
        );
        let svc = TreeService::new(Arc::new(store));

        let tree = svc.get_tree("nmap-basics-linux").await.unwrap();
        assert_eq!(tree.root_node_id, "linux-root");
        assert!(tree.nodes.contains_key("linux-root"));
        assert!(tree.nodes.contains_key(&tree.root_node_id));
    }

    #[tokio::test]
    async fn test_missing_tree_is_not_found() {
        let svc = service(MemoryStore::default(), ReferencePolicy::Strict);

        let err = svc.get_tree("unknown-tree").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Tree not found: unknown-tree");
    }

    #[tokio::test]
    async fn test_empty_id_is_not_found_without_store_access() {
        let svc = TreeService::new(Arc::new(FailingStore(|| {
            DatabaseError::sql_execution("store must not be called")
        })));

        let err = svc.get_tree("").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_schema_violation_is_data_integrity() {
        let mut nodes = linux_nodes();
        nodes["linux-root"]["type"] = json!("radio");
        let store = MemoryStore::default().with("bad", Some("desc"), "linux-root", nodes);
        let svc = service(store, ReferencePolicy::Lenient);

        let err = svc.get_tree("bad").await.unwrap_err();
        match err {
            TreeServiceError::DataIntegrity {
                id,
                fault: IntegrityFault::Schema(e),
            } => {
                assert_eq!(id, "bad");
                assert_eq!(e.path, r#"$.nodes["linux-root"].type"#);
            }
            other => panic!("expected data integrity fault, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_null_description_column_is_data_integrity() {
        let store = MemoryStore::default().with("no-desc", None, "linux-root", linux_nodes());
        let svc = service(store, ReferencePolicy::Lenient);

        let err = svc.get_tree("no-desc").await.unwrap_err();
        assert!(matches!(err, TreeServiceError::DataIntegrity { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_record_is_data_integrity() {
        let svc = TreeService::new(Arc::new(FailingStore(|| {
            DatabaseError::corrupt_record("t1", "nodes: expected value")
        })));

        let err = svc.get_tree("t1").await.unwrap_err();
        assert!(matches!(
            err,
            TreeServiceError::DataIntegrity {
                fault: IntegrityFault::CorruptPayload(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_store_failure_is_store_error() {
        let svc = TreeService::new(Arc::new(FailingStore(|| {
            DatabaseError::sql_execution("disk I/O error")
        })));

        let err = svc.get_tree("t1").await.unwrap_err();
        assert!(matches!(err, TreeServiceError::Store(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_lenient_policy_passes_dangling_references_through() {
        let store = MemoryStore::default().with("loose", Some("d"), "missing-root", dangling_nodes());
        let svc = service(store, ReferencePolicy::Lenient);

        let tree = svc.get_tree("loose").await.unwrap();
        assert_eq!(tree.root_node_id, "missing-root");
        assert_eq!(
            tree.nodes["start"].options[0].next_node_ids,
            Some(vec!["nowhere".to_string()])
        );
    }

    #[tokio::test]
    async fn test_strict_policy_rejects_dangling_references() {
        let store = MemoryStore::default().with("loose", Some("d"), "start", dangling_nodes());
        let svc = service(store, ReferencePolicy::Strict);

        let err = svc.get_tree("loose").await.unwrap_err();
        match err {
            TreeServiceError::DataIntegrity {
                fault: IntegrityFault::UnresolvedReferences(issues),
                ..
            } => assert_eq!(issues.len(), 1),
            other => panic!("expected unresolved references, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_served_tree_round_trips_through_validation() {
        let mut nodes = linux_nodes();
        nodes["linux-root"]["hint"] = json!("nmap -sC -sV target");
        nodes["linux-root"]["hint_type"] = json!("command");
        nodes["linux-root"]["hints"] = json!([{"text": "Check UDP too", "type": "text"}]);
        let store = MemoryStore::default().with("t", Some("d"), "linux-root", nodes);
        let svc = TreeService::new(Arc::new(store));

        let tree = svc.get_tree("t").await.unwrap();
        let transported = tree.to_transport().unwrap();
        assert_eq!(transported["nodes"]["linux-root"]["hint_type"], "command");
        assert_eq!(
            transported["nodes"]["linux-root"]["hints"][0]["text"],
            "Check UDP too"
        );
        assert_eq!(validate(&transported).unwrap(), tree);
    }
}
