//! Database Layer
//!
//! This module handles all database interactions using libsql:
//!
//! - Database initialization and connection management
//! - `trees` table holding each tree's node graph as a JSON payload
//! - [`TreeStore`] read abstraction used by the retrieval service
//!
//! Trees are written only by the batch importer; the request path only reads.

mod database;
mod error;
mod libsql_store;
mod tree_store;

pub use database::{DatabaseService, DbUpsertTreeParams};
pub use error::DatabaseError;
pub use libsql_store::LibsqlTreeStore;
pub use tree_store::{TreeRecord, TreeStore};
