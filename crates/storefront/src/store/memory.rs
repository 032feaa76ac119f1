//! In-memory document store.
//!
//! Backs unit and integration tests, and doubles as the reference
//! semantics for [`DocumentStore`]: all mutations happen under one write
//! lock, which gives `update_with` and `get_or_create` the serialized
//! read-modify-write behavior the trait requires.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use serde_json::Value;

use super::{DocumentStore, StoreError};

type Collection = BTreeMap<String, Value>;

/// An in-memory [`DocumentStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<String, Collection>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn len(&self, collection: &str) -> Result<usize, StoreError> {
        let guard = self.inner.read().map_err(poisoned)?;
        Ok(guard.get(collection).map_or(0, Collection::len))
    }

    /// Whether a collection holds no documents.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if the store lock is poisoned.
    pub fn is_empty(&self, collection: &str) -> Result<bool, StoreError> {
        Ok(self.len(collection)? == 0)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> StoreError {
    StoreError::Unavailable("store lock poisoned".to_owned())
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_owned(),
        id: id.to_owned(),
    }
}

impl DocumentStore for InMemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let guard = self.inner.read().map_err(poisoned)?;
        guard
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    async fn create(&self, collection: &str, id: &str, doc: Value) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        let coll = guard.entry(collection.to_owned()).or_default();
        if coll.contains_key(id) {
            return Err(StoreError::Conflict {
                collection: collection.to_owned(),
                id: id.to_owned(),
            });
        }
        coll.insert(id.to_owned(), doc);
        Ok(())
    }

    async fn get_or_create(
        &self,
        collection: &str,
        id: &str,
        default: Value,
    ) -> Result<(Value, bool), StoreError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        let coll = guard.entry(collection.to_owned()).or_default();
        if let Some(existing) = coll.get(id) {
            return Ok((existing.clone(), false));
        }
        coll.insert(id.to_owned(), default.clone());
        Ok((default, true))
    }

    async fn update_with<E, F>(&self, collection: &str, id: &str, apply: F) -> Result<Value, E>
    where
        F: FnOnce(&mut Value) -> Result<(), E> + Send,
        E: From<StoreError> + Send,
    {
        let mut guard = self.inner.write().map_err(poisoned)?;
        let doc = guard
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;
        // Apply against a working copy so an aborted update is not observable
        let mut working = doc.clone();
        apply(&mut working)?;
        *doc = working.clone();
        Ok(working)
    }

    async fn find_by(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let guard = self.inner.read().map_err(poisoned)?;
        Ok(guard
            .get(collection)
            .map(|c| {
                c.values()
                    .filter(|doc| doc.get(field) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(poisoned)?;
        guard
            .get_mut(collection)
            .and_then(|c| c.remove(id))
            .map(|_| ())
            .ok_or_else(|| not_found(collection, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = InMemoryStore::new();
        store
            .create("things", "a", json!({"x": 1}))
            .await
            .unwrap();
        let doc = store.get("things", "a").await.unwrap();
        assert_eq!(doc, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = InMemoryStore::new();
        store.create("things", "a", json!({})).await.unwrap();
        let err = store.create("things", "a", json!({})).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.get("things", "nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_get_or_create_creates_once() {
        let store = InMemoryStore::new();
        let (doc, created) = store
            .get_or_create("things", "a", json!({"v": 1}))
            .await
            .unwrap();
        assert!(created);
        assert_eq!(doc, json!({"v": 1}));

        // Second call sees the first document, not its own default
        let (doc, created) = store
            .get_or_create("things", "a", json!({"v": 2}))
            .await
            .unwrap();
        assert!(!created);
        assert_eq!(doc, json!({"v": 1}));
        assert_eq!(store.len("things").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_with_applies_atomically() {
        let store = InMemoryStore::new();
        store.create("things", "a", json!({"n": 0})).await.unwrap();

        let updated = store
            .update_with::<StoreError, _>("things", "a", |doc| {
                doc["n"] = json!(doc["n"].as_i64().unwrap_or(0) + 1);
                Ok(())
            })
            .await
            .unwrap();
        assert_eq!(updated, json!({"n": 1}));
    }

    #[tokio::test]
    async fn test_update_with_error_leaves_document_unchanged() {
        let store = InMemoryStore::new();
        store.create("things", "a", json!({"n": 0})).await.unwrap();

        let result = store
            .update_with::<StoreError, _>("things", "a", |doc| {
                doc["n"] = json!(99);
                Err(StoreError::Unavailable("injected".to_owned()))
            })
            .await;
        assert!(result.is_err());
        // An aborted update must not be observable
        let doc = store.get("things", "a").await.unwrap();
        assert_eq!(doc["n"], json!(0));
    }

    #[tokio::test]
    async fn test_find_by_equality() {
        let store = InMemoryStore::new();
        store
            .create("orders", "1", json!({"user_id": "u1", "total": 10}))
            .await
            .unwrap();
        store
            .create("orders", "2", json!({"user_id": "u2", "total": 20}))
            .await
            .unwrap();
        store
            .create("orders", "3", json!({"user_id": "u1", "total": 30}))
            .await
            .unwrap();

        let docs = store
            .find_by("orders", "user_id", &json!("u1"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryStore::new();
        store.create("things", "a", json!({})).await.unwrap();
        store.delete("things", "a").await.unwrap();
        assert!(store.get("things", "a").await.is_err());
        assert!(matches!(
            store.delete("things", "a").await.unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }
}
