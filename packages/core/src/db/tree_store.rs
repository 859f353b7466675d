//! TreeStore Trait - Read Abstraction over Stored Trees
//!
//! The retrieval service only needs a point lookup by tree id. Keeping that
//! behind a trait lets the service run against libsql in production and
//! against in-memory fakes in tests.

use crate::db::DatabaseError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

/// A stored tree exactly as the store holds it
///
/// `nodes` is opaque: nothing about its shape is trusted until the payload
/// goes through [`validate`](crate::models::validate).
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRecord {
    pub id: String,
    pub title: String,
    /// Nullable column; a missing description fails validation on read
    pub description: Option<String>,
    pub root_node_id: String,
    pub nodes: Value,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl TreeRecord {
    /// Assemble the raw document the validator consumes
    ///
    /// Timestamps are storage metadata and are not part of the payload.
    pub fn to_payload(&self) -> Value {
        json!({
            "id": self.id,
            "title": self.title,
            "description": self.description,
            "root_node_id": self.root_node_id,
            "nodes": self.nodes,
        })
    }
}

/// Read access to stored trees
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one store is shared by every
/// concurrent request. Implementations acquire any connection they need per
/// call and release it before returning.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Get a tree record by id
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` if the tree exists
    /// - `Ok(None)` if it doesn't (not an error)
    /// - `Err(_)` if the store failed or the row could not be decoded
    async fn find_by_id(&self, id: &str) -> Result<Option<TreeRecord>, DatabaseError>;
}
