use std::collections::BTreeMap;
use std::path::Path;

use super::{Merge, MergeError, check_identity};
use crate::error::Error;

/// How an unknown attribute is spelled in JSON snapshots.
pub const UNKNOWN_MARKER: &str = "(known after apply)";

/// A dynamically typed snapshot, for entities without a typed schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Unknown,
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<Attr>),
    Object(BTreeMap<String, Attr>),
}

impl Attr {
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Attr::Null,
            serde_json::Value::Bool(b) => Attr::Bool(b),
            serde_json::Value::Number(n) => Attr::Number(n),
            serde_json::Value::String(s) if s == UNKNOWN_MARKER => Attr::Unknown,
            serde_json::Value::String(s) => Attr::String(s),
            serde_json::Value::Array(items) => {
                Attr::List(items.into_iter().map(Attr::from_json).collect())
            }
            serde_json::Value::Object(fields) => Attr::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Attr::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Reads a JSON snapshot from disk.
    pub fn from_file(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path)?;
        let value: serde_json::Value = serde_json::from_str(&raw)?;
        Ok(Attr::from_json(value))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Attr::Unknown => serde_json::Value::String(UNKNOWN_MARKER.to_string()),
            Attr::Null => serde_json::Value::Null,
            Attr::Bool(b) => serde_json::Value::Bool(*b),
            Attr::Number(n) => serde_json::Value::Number(n.clone()),
            Attr::String(s) => serde_json::Value::String(s.clone()),
            Attr::List(items) => serde_json::Value::Array(items.iter().map(Attr::to_json).collect()),
            Attr::Object(fields) => serde_json::Value::Object(
                fields.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Attr::Unknown)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Attr::Null)
    }

    pub fn get(&self, key: &str) -> Option<&Attr> {
        match self {
            Attr::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    /// True if this attribute or anything nested in it is unknown.
    pub fn contains_unknown(&self) -> bool {
        match self {
            Attr::Unknown => true,
            Attr::List(items) => items.iter().any(Attr::contains_unknown),
            Attr::Object(fields) => fields.values().any(Attr::contains_unknown),
            _ => false,
        }
    }

    /// The `id` field as text, when it holds a known scalar. OVH ids are
    /// strings or integers depending on the API.
    fn identity(&self) -> Option<String> {
        match self.get("id")? {
            Attr::String(id) => Some(id.clone()),
            Attr::Number(id) => Some(id.to_string()),
            Attr::Bool(id) => Some(id.to_string()),
            Attr::Unknown | Attr::Null | Attr::List(_) | Attr::Object(_) => None,
        }
    }
}

impl Merge for Attr {
    fn merge_with(&mut self, fallback: &Self) {
        if (self.is_unknown() || self.is_null()) && !fallback.is_unknown() {
            *self = fallback.clone();
            return;
        }

        match (self, fallback) {
            (Attr::Object(primary), Attr::Object(fallback)) => {
                for (key, other) in fallback {
                    match primary.get_mut(key) {
                        Some(item) => item.merge_with(other),
                        // A missing key is read as null.
                        None if !other.is_unknown() => {
                            primary.insert(key.clone(), other.clone());
                        }
                        None => {}
                    }
                }
            }
            (Attr::List(primary), Attr::List(fallback)) if primary.len() == fallback.len() => {
                for (item, other) in primary.iter_mut().zip(fallback) {
                    item.merge_with(other);
                }
            }
            _ => {}
        }
    }
}

/// Merges two dynamic snapshots, rejecting them when their `id` fields are
/// both known and differ.
pub fn merge_attrs(mut primary: Attr, fallback: &Attr) -> Result<Attr, MergeError> {
    check_identity(primary.identity().as_ref(), fallback.identity().as_ref())?;
    primary.merge_with(fallback);
    Ok(primary)
}
