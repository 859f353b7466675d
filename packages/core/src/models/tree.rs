//! Decision Tree Data Structures
//!
//! This module defines the canonical `Tree`, `Node` and `NodeOption` types
//! served to walkthrough clients.
//!
//! # Architecture
//!
//! - **Schema-on-read**: Stored payloads are opaque JSON; these types are only
//!   produced by [`validate`](crate::models::validate) on the read path
//! - **Graph-shaped**: Options may point at any node, so several options can
//!   share a successor
//! - **Dual hints**: The legacy `hint`/`hint_type` pair and the structured
//!   `hints` list are independent fields and are never reconciled
//! - **Serialize only**: [`validate`](crate::models::validate) is the single
//!   way in; serde only shapes the outgoing transport form
//!
//! # Examples
//!
//! ```rust
//! use tracetree_core::models::{validate, NodeType};
//! use serde_json::json;
//!
//! let tree = validate(&json!({
//!     "id": "nmap-basics-linux",
//!     "title": "Linux Machine Exploitation",
//!     "description": "Step by step",
//!     "root_node_id": "linux-root",
//!     "nodes": {
//!         "linux-root": {
//!             "id": "linux-root",
//!             "question": "Run an nmap scan",
//!             "type": "select",
//!             "options": [{"id": "opt-1", "label": "dummy", "next_node_ids": []}]
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! assert_eq!(tree.root_node().unwrap().node_type, NodeType::Select);
//! ```

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Interaction shape a client uses to render a node
///
/// The server does not enforce option counts per type; that is left to the
/// client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Pick exactly one option
    Select,
    /// Pick any number of options
    Multiselect,
    /// Free-form text answer
    Text,
}

impl NodeType {
    /// All accepted type tags, in schema order
    pub const ALL: [NodeType; 3] = [NodeType::Select, NodeType::Multiselect, NodeType::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Text => "text",
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "select" => Ok(Self::Select),
            "multiselect" => Ok(Self::Multiselect),
            "text" => Ok(Self::Text),
            _ => Err(format!("Invalid node type: {}", s)),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a hint's text should be presented (shell command vs prose)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HintKind {
    Command,
    Text,
}

impl HintKind {
    pub const ALL: [HintKind; 2] = [HintKind::Command, HintKind::Text];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "command",
            Self::Text => "text",
        }
    }
}

impl FromStr for HintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "command" => Ok(Self::Command),
            "text" => Ok(Self::Text),
            _ => Err(format!("Invalid hint kind: {}", s)),
        }
    }
}

impl fmt::Display for HintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a node's structured `hints` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hint {
    pub text: String,

    #[serde(rename = "type")]
    pub kind: HintKind,
}

/// A selectable choice on a node
///
/// `next_node_ids` keeps the difference between an explicit empty list and a
/// missing field. The legacy single `next_node_id` is carried beside it and
/// never merged into the list, the same way the two hint forms are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeOption {
    /// Unique within the owning node's option list
    pub id: String,

    pub label: String,

    /// Legacy single successor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_node_id: Option<String>,

    /// Successor node ids, in author order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_node_ids: Option<Vec<String>>,
}

impl NodeOption {
    /// Whether choosing this option ends the walkthrough
    pub fn is_terminal(&self) -> bool {
        self.next_node_id.is_none() && self.successors().is_empty()
    }

    /// Ids from `next_node_ids`, empty when the list is absent
    pub fn successors(&self) -> &[String] {
        self.next_node_ids.as_deref().unwrap_or(&[])
    }

    /// Every node id this option points at: the legacy `next_node_id`
    /// first, then `next_node_ids` in order
    pub fn targets(&self) -> impl Iterator<Item = &String> {
        self.next_node_id.iter().chain(self.successors())
    }
}

/// A single question/step of a walkthrough.
///
/// # Fields
///
/// - `id`: Must equal the node's key in [`Tree::nodes`]
/// - `question`: Prompt shown to the user
/// - `node_type`: Render-type tag, serialized as `type`
/// - `command`: Legacy command line attached to the step
/// - `description`: Optional longer explanation
/// - `hint` / `hint_type`: Legacy single hint
/// - `hints`: Structured hints
/// - `options`: Ordered choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,

    pub question: String,

    #[serde(rename = "type")]
    pub node_type: NodeType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_type: Option<HintKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints: Option<Vec<Hint>>,

    pub options: Vec<NodeOption>,
}

impl Node {
    /// Look up an option by id
    pub fn option(&self, option_id: &str) -> Option<&NodeOption> {
        self.options.iter().find(|o| o.id == option_id)
    }
}

/// A complete decision tree as served to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tree {
    /// Stable store key
    pub id: String,

    pub title: String,

    pub description: String,

    /// Entry point; expected to be a key of `nodes`
    pub root_node_id: String,

    /// Node id to node; ordered by key so output is deterministic
    pub nodes: BTreeMap<String, Node>,
}

impl Tree {
    /// The node `root_node_id` points at, if it exists
    pub fn root_node(&self) -> Option<&Node> {
        self.nodes.get(&self.root_node_id)
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    /// Shape the tree for transport.
    ///
    /// Field names and nesting match the schema exactly; absent optional
    /// fields are omitted. Feeding the result back through
    /// [`validate`](crate::models::validate) yields an equal `Tree`.
    pub fn to_transport(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}
