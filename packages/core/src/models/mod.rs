//! Data Models
//!
//! This module contains the decision-tree schema and the passes that enforce it:
//!
//! - `Tree`, `Node`, `NodeOption`, `Hint` - canonical shapes served to clients
//! - [`validate`] - structural validation of untyped payloads
//! - [`check_referential_integrity`] - optional pass reporting dangling references

mod integrity;
mod tree;
mod validation;

pub use integrity::{check_referential_integrity, IntegrityIssue};
pub use tree::{Hint, HintKind, Node, NodeOption, NodeType, Tree};
pub use validation::{validate, SchemaValidationError};
