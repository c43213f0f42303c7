//! Whitelist document (db_schema_whitelist.json)
//!
//! The document maps table name -> element category -> element name -> `true`.
//! Leaves are presence markers, so the document is a nested set encoded as
//! JSON objects. Merging is a recursive union of keys where the later layer
//! wins on leaf conflicts.

use serde::de::{self, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::Path;

/// Category of a table element inside a whitelist entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementCategory {
    Column,
    Index,
    Constraint,
}

impl ElementCategory {
    /// Key used in the whitelist document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Column => "column",
            Self::Index => "index",
            Self::Constraint => "constraint",
        }
    }
}

impl std::fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the whitelist tree: either a nested mapping or a leaf flag
///
/// An empty JSON array reads as an empty branch, since files written by
/// PHP tooling encode an empty mapping as `[]`. Branches always serialize
/// as objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WhitelistNode {
    Flag(bool),
    Branch(BTreeMap<String, WhitelistNode>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNode {
    Flag(bool),
    Branch(BTreeMap<String, WhitelistNode>),
    List(Vec<IgnoredAny>),
}

impl<'de> Deserialize<'de> for WhitelistNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match RawNode::deserialize(deserializer)? {
            RawNode::Flag(flag) => Ok(Self::Flag(flag)),
            RawNode::Branch(children) => Ok(Self::Branch(children)),
            RawNode::List(items) if items.is_empty() => Ok(Self::branch()),
            RawNode::List(items) => Err(de::Error::custom(format!(
                "expected a mapping or flag, found a list of {} items",
                items.len()
            ))),
        }
    }
}

impl WhitelistNode {
    /// An empty branch
    pub fn branch() -> Self {
        Self::Branch(BTreeMap::new())
    }

    /// Child node by key, if this is a branch
    pub fn get(&self, key: &str) -> Option<&WhitelistNode> {
        match self {
            Self::Branch(children) => children.get(key),
            Self::Flag(_) => None,
        }
    }

    /// Keys of a branch, empty for a leaf
    pub fn keys(&self) -> Vec<&str> {
        match self {
            Self::Branch(children) => children.keys().map(String::as_str).collect(),
            Self::Flag(_) => Vec::new(),
        }
    }
}

/// Recursively merge `overlay` into `base`
///
/// Branches present on both sides are merged key by key; anything else in
/// `overlay` replaces what `base` holds at that key.
pub fn merge_branches(base: &mut BTreeMap<String, WhitelistNode>, overlay: BTreeMap<String, WhitelistNode>) {
    for (key, node) in overlay {
        match base.entry(key) {
            Entry::Occupied(mut slot) => match (slot.get_mut(), node) {
                (WhitelistNode::Branch(existing), WhitelistNode::Branch(incoming)) => {
                    merge_branches(existing, incoming)
                }
                (current, node) => *current = node,
            },
            Entry::Vacant(slot) => {
                slot.insert(node);
            }
        }
    }
}

/// Whitelist document for one module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WhitelistDocument {
    tables: BTreeMap<String, WhitelistNode>,
}

impl WhitelistDocument {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document from file
    ///
    /// A file holding only whitespace is treated as an empty document.
    pub fn from_file(path: &Path) -> Result<Self, WhitelistError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WhitelistError::IoError(path.display().to_string(), e.to_string()))?;

        Self::from_json(&contents)
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self, WhitelistError> {
        if json.trim().is_empty() {
            return Ok(Self::new());
        }

        serde_json::from_str(json).map_err(|e| WhitelistError::ParseError(e.to_string()))
    }

    /// Load the document at `path`, or an empty one when the file does not exist
    pub fn load_or_default(path: &Path) -> Result<Self, WhitelistError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::new())
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whitelisted table names, sorted
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Entry of a table
    pub fn table(&self, name: &str) -> Option<&WhitelistNode> {
        self.tables.get(name)
    }

    /// Element names recorded for a table under a category
    pub fn elements(&self, table: &str, category: ElementCategory) -> Vec<&str> {
        self.table(table)
            .and_then(|node| node.get(category.as_str()))
            .map(WhitelistNode::keys)
            .unwrap_or_default()
    }

    /// Whether an element is whitelisted
    pub fn contains(&self, table: &str, category: ElementCategory, name: &str) -> bool {
        matches!(
            self.table(table)
                .and_then(|node| node.get(category.as_str()))
                .and_then(|node| node.get(name)),
            Some(WhitelistNode::Flag(true))
        )
    }

    /// Mark an element as whitelisted
    pub fn insert(&mut self, table: impl Into<String>, category: ElementCategory, name: impl Into<String>) {
        let mut element = BTreeMap::new();
        element.insert(name.into(), WhitelistNode::Flag(true));

        let mut entry = BTreeMap::new();
        entry.insert(category.as_str().to_string(), WhitelistNode::Branch(element));

        let mut overlay = BTreeMap::new();
        overlay.insert(table.into(), WhitelistNode::Branch(entry));

        merge_branches(&mut self.tables, overlay);
    }

    /// Make sure `table` has an entry, even if it whitelists nothing
    pub fn ensure_table(&mut self, table: impl Into<String>) {
        self.tables.entry(table.into()).or_insert_with(WhitelistNode::branch);
    }

    /// Merge another document into this one, `overlay` winning on leaf conflicts
    pub fn merge(&mut self, overlay: WhitelistDocument) {
        merge_branches(&mut self.tables, overlay.tables);
    }

    /// Merge layers left to right into a single document
    pub fn merged<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = WhitelistDocument>,
    {
        layers.into_iter().fold(Self::new(), |mut acc, layer| {
            acc.merge(layer);
            acc
        })
    }

    /// Serialize as a JSON value
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.tables).unwrap_or(serde_json::Value::Null)
    }
}

/// Whitelist error types
#[derive(Debug, thiserror::Error)]
pub enum WhitelistError {
    #[error("Failed to read whitelist {0}: {1}")]
    IoError(String, String),

    #[error("Invalid whitelist JSON: {0}")]
    ParseError(String),
}
