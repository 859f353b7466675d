//! Structural Tree Validation
//!
//! Turns an untyped JSON value into a [`Tree`], checking field presence,
//! primitive types and the closed tag sets. Validation stops at the first
//! violation and reports its field path.
//!
//! Referential checks (root and successor ids resolving to real nodes) are
//! not done here; see [`check_referential_integrity`](super::check_referential_integrity).
//!
//! Paths use `$` for the document root, `.field` for object members,
//! `["key"]` for node map keys and `[n]` for list positions, e.g.
//! `$.nodes["linux-root"].options[0].label`.

use crate::models::{Hint, HintKind, Node, NodeOption, NodeType, Tree};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

const ROOT: &str = "$";

/// First schema violation found in a payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Schema validation failed at {path}: expected {expected}, found {actual}")]
pub struct SchemaValidationError {
    /// Location of the failing field
    pub path: String,
    /// Shape the schema requires
    pub expected: String,
    /// Shape actually present (`missing` when the field is absent)
    pub actual: String,
}

impl SchemaValidationError {
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

type Result<T> = std::result::Result<T, SchemaValidationError>;

/// Validate an arbitrary payload against the tree schema.
///
/// Optional fields that are missing or `null` come back as `None`. Unknown
/// fields are ignored. This is a pure function.
///
/// # Errors
///
/// Returns the first [`SchemaValidationError`] encountered, checking top-level
/// fields in schema order and then each node in key order.
pub fn validate(raw: &Value) -> Result<Tree> {
    let obj = expect_object(raw, ROOT)?;

    let id = required_string(obj, ROOT, "id")?;
    let title = required_string(obj, ROOT, "title")?;
    let description = required_string(obj, ROOT, "description")?;
    let root_node_id = required_string(obj, ROOT, "root_node_id")?;
    let nodes = validate_nodes(obj, ROOT)?;

    Ok(Tree {
        id,
        title,
        description,
        root_node_id,
        nodes,
    })
}

fn validate_nodes(parent: &Map<String, Value>, path: &str) -> Result<BTreeMap<String, Node>> {
    let nodes_path = member(path, "nodes");
    let value = required(parent, path, "nodes")?;
    let map = expect_object(value, &nodes_path)?;

    let mut nodes = BTreeMap::new();
    for (key, node_value) in map {
        let node_path = format!("{}[{:?}]", nodes_path, key);
        nodes.insert(key.clone(), validate_node(node_value, &node_path)?);
    }
    Ok(nodes)
}

fn validate_node(value: &Value, path: &str) -> Result<Node> {
    let obj = expect_object(value, path)?;

    let id = required_string(obj, path, "id")?;
    let question = required_string(obj, path, "question")?;
    let node_type = required_tag(obj, path, "type", &NodeType::ALL, NodeType::as_str)?;
    let command = optional_string(obj, path, "command")?;
    let description = optional_string(obj, path, "description")?;
    let hint = optional_string(obj, path, "hint")?;
    let hint_type = optional_tag(obj, path, "hint_type", &HintKind::ALL, HintKind::as_str)?;
    let hints = optional_list(obj, path, "hints", validate_hint)?;
    let options = required_list(obj, path, "options", validate_option)?;

    Ok(Node {
        id,
        question,
        node_type,
        command,
        description,
        hint,
        hint_type,
        hints,
        options,
    })
}

fn validate_option(value: &Value, path: &str) -> Result<NodeOption> {
    let obj = expect_object(value, path)?;

    Ok(NodeOption {
        id: required_string(obj, path, "id")?,
        label: required_string(obj, path, "label")?,
        next_node_id: optional_string(obj, path, "next_node_id")?,
        next_node_ids: optional_list(obj, path, "next_node_ids", |v, p| {
            expect_string(v, p).map(str::to_string)
        })?,
    })
}

fn validate_hint(value: &Value, path: &str) -> Result<Hint> {
    let obj = expect_object(value, path)?;

    Ok(Hint {
        text: required_string(obj, path, "text")?,
        kind: required_tag(obj, path, "type", &HintKind::ALL, HintKind::as_str)?,
    })
}

//
// FIELD HELPERS
//

fn member(path: &str, field: &str) -> String {
    format!("{}.{}", path, field)
}

fn index(path: &str, i: usize) -> String {
    format!("{}[{}]", path, i)
}

/// Short description of a value's JSON kind for error messages
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(_) => "number".to_string(),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn expect_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| SchemaValidationError::new(path, "object", describe(value)))
}

fn expect_string<'a>(value: &'a Value, path: &str) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| SchemaValidationError::new(path, "string", describe(value)))
}

fn expect_array<'a>(value: &'a Value, path: &str) -> Result<&'a Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| SchemaValidationError::new(path, "array", describe(value)))
}

fn required<'a>(obj: &'a Map<String, Value>, path: &str, field: &str) -> Result<&'a Value> {
    obj.get(field)
        .ok_or_else(|| SchemaValidationError::new(member(path, field), "present", "missing"))
}

/// Absent and `null` both mean "not provided" for optional fields
fn optional<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required_string(obj: &Map<String, Value>, path: &str, field: &str) -> Result<String> {
    let value = required(obj, path, field)?;
    expect_string(value, &member(path, field)).map(str::to_string)
}

fn optional_string(obj: &Map<String, Value>, path: &str, field: &str) -> Result<Option<String>> {
    optional(obj, field)
        .map(|v| expect_string(v, &member(path, field)).map(str::to_string))
        .transpose()
}

fn parse_tag<T: Copy>(
    value: &Value,
    path: &str,
    allowed: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T> {
    let expected = || {
        let names: Vec<_> = allowed.iter().map(|t| format!("{:?}", name(t))).collect();
        format!("one of {}", names.join(" | "))
    };

    let s = value
        .as_str()
        .ok_or_else(|| SchemaValidationError::new(path, expected(), describe(value)))?;

    allowed
        .iter()
        .copied()
        .find(|t| name(t) == s)
        .ok_or_else(|| SchemaValidationError::new(path, expected(), format!("{:?}", s)))
}

fn required_tag<T: Copy>(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    allowed: &[T],
    name: fn(&T) -> &'static str,
) -> Result<T> {
    let value = required(obj, path, field)?;
    parse_tag(value, &member(path, field), allowed, name)
}

fn optional_tag<T: Copy>(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    allowed: &[T],
    name: fn(&T) -> &'static str,
) -> Result<Option<T>> {
    optional(obj, field)
        .map(|v| parse_tag(v, &member(path, field), allowed, name))
        .transpose()
}

fn list<T>(value: &Value, path: &str, item: fn(&Value, &str) -> Result<T>) -> Result<Vec<T>> {
    expect_array(value, path)?
        .iter()
        .enumerate()
        .map(|(i, v)| item(v, &index(path, i)))
        .collect()
}

fn required_list<T>(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    item: fn(&Value, &str) -> Result<T>,
) -> Result<Vec<T>> {
    let value = required(obj, path, field)?;
    list(value, &member(path, field), item)
}

fn optional_list<T>(
    obj: &Map<String, Value>,
    path: &str,
    field: &str,
    item: fn(&Value, &str) -> Result<T>,
) -> Result<Option<Vec<T>>> {
    optional(obj, field)
        .map(|v| list(v, &member(path, field), item))
        .transpose()
}
