//! Referential Integrity Pass
//!
//! A second, optional pass over an already validated [`Tree`] that reports
//! references which do not resolve. It never modifies the tree.

use crate::models::Tree;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// A single referential problem found in a tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// `root_node_id` is not a key of `nodes`
    MissingRoot { root_node_id: String },

    /// An option's `next_node_id` or `next_node_ids` entry is not a key of `nodes`
    DanglingNextNode {
        node_id: String,
        option_id: String,
        target: String,
    },

    /// A node's own `id` differs from the key it is stored under
    NodeKeyMismatch { key: String, node_id: String },

    /// Two options of the same node share an id
    DuplicateOptionId { node_id: String, option_id: String },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRoot { root_node_id } => {
                write!(f, "root node '{}' does not exist", root_node_id)
            }
            Self::DanglingNextNode {
                node_id,
                option_id,
                target,
            } => write!(
                f,
                "option '{}' of node '{}' points at missing node '{}'",
                option_id, node_id, target
            ),
            Self::NodeKeyMismatch { key, node_id } => {
                write!(f, "node stored under '{}' has id '{}'", key, node_id)
            }
            Self::DuplicateOptionId { node_id, option_id } => {
                write!(f, "node '{}' has duplicate option id '{}'", node_id, option_id)
            }
        }
    }
}

/// Check that every reference inside `tree` resolves.
///
/// Returns every issue found (not just the first), in a deterministic order:
/// the root first, then nodes in key order and options in list order.
pub fn check_referential_integrity(tree: &Tree) -> Result<(), Vec<IntegrityIssue>> {
    let mut issues = Vec::new();

    if !tree.nodes.contains_key(&tree.root_node_id) {
        issues.push(IntegrityIssue::MissingRoot {
            root_node_id: tree.root_node_id.clone(),
        });
    }

    for (key, node) in &tree.nodes {
        if &node.id != key {
            issues.push(IntegrityIssue::NodeKeyMismatch {
                key: key.clone(),
                node_id: node.id.clone(),
            });
        }

        let mut seen = HashSet::new();
        for option in &node.options {
            if !seen.insert(option.id.as_str()) {
                issues.push(IntegrityIssue::DuplicateOptionId {
                    node_id: key.clone(),
                    option_id: option.id.clone(),
                });
            }

            for target in option.targets() {
                if !tree.nodes.contains_key(target) {
                    issues.push(IntegrityIssue::DanglingNextNode {
                        node_id: key.clone(),
                        option_id: option.id.clone(),
                        target: target.clone(),
                    });
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
