//! # In-Memory Document Store
//!
//! HashMap-backed [`DocumentStore`] used by tests and by the service layer
//! before a database path is configured.
//!
//! Supports failure injection so the partial-aggregation policy (a failing
//! day is skipped, the range survives) can be exercised without a real
//! backend outage.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::document::{DocumentStore, Lookup};
use crate::error::{StoreError, StoreResult};

type Key = (String, String);

/// Clonable in-memory store; clones share the same documents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    documents: Arc<RwLock<HashMap<Key, Value>>>,
    /// Keys whose reads and writes fail with `StoreError::Unavailable`.
    failing: Arc<RwLock<HashSet<Key>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks one document as unreachable: every get/put against it fails
    /// until [`MemoryStore::heal`] is called.
    pub async fn inject_failure(&self, collection: &str, key: &str) {
        self.failing
            .write()
            .await
            .insert((collection.to_string(), key.to_string()));
    }

    /// Clears all injected failures.
    pub async fn heal(&self) {
        self.failing.write().await.clear();
    }

    /// Number of stored documents, across all collections.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    async fn check_reachable(&self, collection: &str, key: &str) -> StoreResult<()> {
        let failing = self.failing.read().await;
        if failing.contains(&(collection.to_string(), key.to_string())) {
            return Err(StoreError::Unavailable(format!(
                "{collection}/{key} is unreachable"
            )));
        }
        Ok(())
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Lookup<Value>> {
        self.check_reachable(collection, key).await?;
        let documents = self.documents.read().await;
        Ok(documents
            .get(&(collection.to_string(), key.to_string()))
            .cloned()
            .into())
    }

    async fn put(&self, collection: &str, key: &str, body: Value) -> StoreResult<()> {
        self.check_reachable(collection, key).await?;
        self.documents
            .write()
            .await
            .insert((collection.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        self.check_reachable(collection, key).await?;
        self.documents
            .write()
            .await
            .remove(&(collection.to_string(), key.to_string()));
        Ok(())
    }

    async fn list(&self, collection: &str) -> StoreResult<Vec<(String, Value)>> {
        let documents = self.documents.read().await;
        let mut entries: Vec<(String, Value)> = documents
            .iter()
            .filter(|((coll, _), _)| coll == collection)
            .map(|((_, key), body)| (key.clone(), body.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_roundtrip_and_absence() {
        let store = MemoryStore::new();
        assert_eq!(store.get("stock", "2026-08-23").await.unwrap(), Lookup::NotFound);

        store
            .put("stock", "2026-08-23", json!({ "Marraqueta": 20 }))
            .await
            .unwrap();
        assert_eq!(
            store.get("stock", "2026-08-23").await.unwrap(),
            Lookup::Exists(json!({ "Marraqueta": 20 }))
        );

        store.delete("stock", "2026-08-23").await.unwrap();
        assert_eq!(store.get("stock", "2026-08-23").await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn test_clones_share_documents() {
        let store = MemoryStore::new();
        let clone = store.clone();
        clone.put("pos", "2026-08-23", json!({})).await.unwrap();
        assert!(store.get("pos", "2026-08-23").await.unwrap().exists());
    }

    #[tokio::test]
    async fn test_list_is_keyed_and_ordered() {
        let store = MemoryStore::new();
        store.put("history", "2026-08-22", json!(2)).await.unwrap();
        store.put("history", "2026-08-21", json!(1)).await.unwrap();
        store.put("stock", "2026-08-21", json!(0)).await.unwrap();

        let listed = store.list("history").await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].0, "2026-08-21");
        assert_eq!(listed[1].0, "2026-08-22");
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryStore::new();
        store.put("history", "2026-08-22", json!({})).await.unwrap();
        store.inject_failure("history", "2026-08-22").await;

        assert!(matches!(
            store.get("history", "2026-08-22").await,
            Err(StoreError::Unavailable(_))
        ));
        // Other keys are unaffected.
        assert!(store.get("history", "2026-08-21").await.is_ok());

        store.heal().await;
        assert!(store.get("history", "2026-08-22").await.unwrap().exists());
    }
}
