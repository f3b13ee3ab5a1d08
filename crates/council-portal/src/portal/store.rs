use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Collection names used by the portal.
pub mod collections {
    pub const APPLICATIONS: &str = "applications";
    pub const INTERVIEWS: &str = "interviews";
    pub const APPLICATION_GRADES: &str = "application_grades";
    pub const INTERVIEW_GRADES: &str = "interview_grades";
}

/// Address of one document in the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentKey {
    pub collection: &'static str,
    pub id: String,
}

impl DocumentKey {
    pub fn new(collection: &'static str, id: impl Into<String>) -> Self {
        Self {
            collection,
            id: id.into(),
        }
    }
}

/// Predicate accepted by `query`; nested fields are filtered by callers.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentFilter {
    All,
    FieldEquals { field: String, value: Value },
}

impl DocumentFilter {
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    fn matches(&self, document: &Value) -> bool {
        match self {
            DocumentFilter::All => true,
            DocumentFilter::FieldEquals { field, value } => {
                document.get(field) == Some(value)
            }
        }
    }
}

/// The hosted document database, reduced to the four primitives every portal
/// operation is built from. There are no cross-document transactions; a
/// read-modify-write sequence over these calls carries a lost-update hazard
/// under concurrent writers.
pub trait DocumentStore: Send + Sync {
    fn get(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError>;

    /// Writes a document. With `merge`, top-level fields of `value` are laid
    /// over the existing document; without it the document is replaced.
    fn set(&self, key: &DocumentKey, value: Value, merge: bool) -> Result<(), StoreError>;

    /// Patches top-level fields of an existing document. A `null` field
    /// value deletes that field. Fails with `NotFound` when the document
    /// does not exist.
    fn update(&self, key: &DocumentKey, fields: Map<String, Value>) -> Result<(), StoreError>;

    fn query(
        &self,
        collection: &'static str,
        filter: &DocumentFilter,
    ) -> Result<Vec<Value>, StoreError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reads and deserializes one document, `None` when absent.
pub(crate) fn read_doc<T, S>(store: &S, key: &DocumentKey) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    match store.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serializes and writes one document.
pub(crate) fn write_doc<T, S>(
    store: &S,
    key: &DocumentKey,
    record: &T,
    merge: bool,
) -> Result<(), StoreError>
where
    T: Serialize,
    S: DocumentStore + ?Sized,
{
    store.set(key, serde_json::to_value(record)?, merge)
}

/// In-memory store used by the API binary and the test suite. Merge lays
/// top-level fields over the stored object, mirroring the hosted store's
/// field-granular merge writes.
#[derive(Default, Clone)]
pub struct MemoryStore {
    documents: Arc<Mutex<HashMap<(&'static str, String), Value>>>,
}

impl DocumentStore for MemoryStore {
    fn get(&self, key: &DocumentKey) -> Result<Option<Value>, StoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        Ok(guard.get(&(key.collection, key.id.clone())).cloned())
    }

    fn set(&self, key: &DocumentKey, value: Value, merge: bool) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        let entry = guard
            .entry((key.collection, key.id.clone()))
            .or_insert(Value::Object(Map::new()));
        let value = if merge {
            match (entry.as_object_mut(), value) {
                (Some(existing), Value::Object(incoming)) => {
                    for (field, field_value) in incoming {
                        existing.insert(field, field_value);
                    }
                    return Ok(());
                }
                (_, other) => other,
            }
        } else {
            value
        };
        *entry = value;
        Ok(())
    }

    fn update(&self, key: &DocumentKey, fields: Map<String, Value>) -> Result<(), StoreError> {
        let mut guard = self.documents.lock().expect("store mutex poisoned");
        let entry = guard
            .get_mut(&(key.collection, key.id.clone()))
            .ok_or(StoreError::NotFound)?;
        let Value::Object(existing) = entry else {
            return Err(StoreError::Unavailable(format!(
                "document {}/{} is not an object",
                key.collection, key.id
            )));
        };
        for (field, field_value) in fields {
            if field_value.is_null() {
                existing.remove(&field);
            } else {
                existing.insert(field, field_value);
            }
        }
        Ok(())
    }

    fn query(
        &self,
        collection: &'static str,
        filter: &DocumentFilter,
    ) -> Result<Vec<Value>, StoreError> {
        let guard = self.documents.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|((stored_collection, _), _)| *stored_collection == collection)
            .map(|(_, document)| document)
            .filter(|document| filter.matches(document))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(id: &str) -> DocumentKey {
        DocumentKey::new(collections::APPLICATIONS, id)
    }

    #[test]
    fn merge_lays_fields_over_existing_document() {
        let store = MemoryStore::default();
        store
            .set(&key("a"), json!({ "x": 1, "y": 2 }), false)
            .expect("initial write");
        store
            .set(&key("a"), json!({ "y": 9 }), true)
            .expect("merge write");

        let stored = store.get(&key("a")).expect("get").expect("present");
        assert_eq!(stored, json!({ "x": 1, "y": 9 }));
    }

    #[test]
    fn update_null_deletes_the_field() {
        let store = MemoryStore::default();
        store
            .set(&key("a"), json!({ "x": 1, "y": 2 }), false)
            .expect("initial write");

        let mut fields = Map::new();
        fields.insert("y".to_string(), Value::Null);
        store.update(&key("a"), fields).expect("update");

        let stored = store.get(&key("a")).expect("get").expect("present");
        assert_eq!(stored, json!({ "x": 1 }));
    }

    #[test]
    fn update_missing_document_is_not_found() {
        let store = MemoryStore::default();
        let result = store.update(&key("ghost"), Map::new());
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    #[test]
    fn query_filters_by_top_level_field() {
        let store = MemoryStore::default();
        store
            .set(&key("a"), json!({ "position": "treasurer" }), false)
            .expect("write");
        store
            .set(&key("b"), json!({ "position": "secretary" }), false)
            .expect("write");

        let hits = store
            .query(
                collections::APPLICATIONS,
                &DocumentFilter::field_equals("position", "treasurer"),
            )
            .expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["position"], json!("treasurer"));
    }
}
