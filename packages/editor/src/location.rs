//! Wire-level input schemas for the edit operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a target position in a parent's element-only child ordering is
/// specified.
///
/// A closed union: every operation matches all four variants explicitly and
/// returns a typed `Unsupported` error for the ones it declines, rather than
/// falling back to a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Index,
    Append,
    Prepend,
    Selector,
}

/// Position descriptor over the element-only view.
///
/// `index` values are indices into the filtered element-only view of the
/// parent's children, never into the raw children array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDescriptor {
    pub position: Position,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_selector: Option<String>,
}

impl LocationDescriptor {
    pub fn at_index(index: usize) -> Self {
        Self {
            position: Position::Index,
            index: Some(index),
            target_selector: None,
        }
    }

    pub fn append() -> Self {
        Self {
            position: Position::Append,
            index: None,
            target_selector: None,
        }
    }

    pub fn prepend() -> Self {
        Self {
            position: Position::Prepend,
            index: None,
            target_selector: None,
        }
    }
}

/// Recursive element specification for Insert and Group.
///
/// Attribute values are either plain strings (emitted as quoted literals) or
/// arbitrary JSON objects (emitted as expressions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertSpec {
    pub tag_name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<InsertSpec>,
}

impl InsertSpec {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}
