//! Documents and document addressing.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Prefix of the attributes managed by the document store itself
/// (`_rid`, `_etag`, `_ts`, `_self`, `_attachments`).
pub const SYSTEM_ATTR_PREFIX: char = '_';

/// A document as returned by the store: a JSON object including system
/// attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocInfo(pub Map<String, Value>);

impl DocInfo {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns a string-valued field.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Returns the document id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    /// Returns the store-assigned resource id (`_rid`).
    #[must_use]
    pub fn rid(&self) -> Option<&str> {
        self.get_str("_rid")
    }

    /// Returns the concurrency token (`_etag`).
    #[must_use]
    pub fn etag(&self) -> Option<&str> {
        self.get_str("_etag")
    }

    /// Returns the field names of the document.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the user payload with all system attributes removed.
    #[must_use]
    pub fn remove_system_attrs(&self) -> Map<String, Value> {
        self.0
            .iter()
            .filter(|(key, _)| !key.starts_with(SYSTEM_ATTR_PREFIX))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Consumes the document, returning the underlying object.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DocInfo {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Everything needed to create or replace a document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSpec {
    /// Database name.
    pub db_name: String,
    /// Collection name.
    pub coll_name: String,
    /// Whether a create may overwrite an existing document.
    pub is_upsert: bool,
    /// Partition key values.
    pub partition_key_values: Vec<Value>,
    /// Document payload.
    pub document_data: Map<String, Value>,
}

/// Identifies an existing document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRef {
    /// Database name.
    pub db_name: String,
    /// Collection name.
    pub coll_name: String,
    /// Document id.
    pub doc_id: String,
    /// Partition key values.
    pub partition_key_values: Vec<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> DocInfo {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_system_accessors() {
        let d = doc(json!({"id": "1", "_rid": "abc==", "_etag": "\"0001\""}));
        assert_eq!(d.id(), Some("1"));
        assert_eq!(d.rid(), Some("abc=="));
        assert_eq!(d.etag(), Some("\"0001\""));
    }

    #[test]
    fn test_remove_system_attrs() {
        let d = doc(json!({
            "id": "1",
            "name": "a",
            "_rid": "r",
            "_etag": "e",
            "_ts": 1,
            "_self": "s",
            "_attachments": "a/"
        }));
        let payload = d.remove_system_attrs();
        assert_eq!(Value::Object(payload), json!({"id": "1", "name": "a"}));
        assert_eq!(d.len(), 7);
    }
}
