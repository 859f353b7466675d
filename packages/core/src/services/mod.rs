//! Business Services
//!
//! - `TreeService` - validated single-tree retrieval over a [`TreeStore`](crate::db::TreeStore)
//!
//! Services coordinate between the database layer and the transport layer;
//! they never talk HTTP themselves.

pub mod error;
pub mod tree_service;

pub use error::{IntegrityFault, TreeServiceError};
pub use tree_service::{ReferencePolicy, TreeService};
