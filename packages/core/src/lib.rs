//! TraceTree Core
//!
//! This crate provides the decision-tree data model, its validation contract,
//! storage and the read path used by the TraceTree HTTP service.
//!
//! # Architecture
//!
//! - **Schema-on-read**: Trees are stored as opaque JSON payloads and
//!   validated every time they are served
//! - **libsql**: Embedded SQLite-compatible database, one `trees` table
//! - **Read-only serving**: Only the batch importer writes
//!
//! # Modules
//!
//! - [`models`] - Tree/Node/Option types, structural validator, integrity pass
//! - [`db`] - Database layer and the [`db::TreeStore`] abstraction
//! - [`services`] - [`services::TreeService`] retrieval orchestration
//! - [`import`] - Batch loader from JSON documents
//! - [`config`] - Store configuration

pub mod config;
pub mod db;
pub mod import;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::StoreConfig;
pub use db::{DatabaseError, DatabaseService, LibsqlTreeStore, TreeRecord, TreeStore};
pub use models::*;
pub use services::*;
