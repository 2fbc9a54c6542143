//! In-memory document store

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{Collection, Document, DocumentStore};
use crate::error::Result;

type Collections = HashMap<Collection, BTreeMap<String, Document>>;

/// Volatile store for tests and throwaway runs
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn scan(&self, collection: Collection) -> Result<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn put(&self, collection: Collection, id: &str, doc: Document) -> Result<()> {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .insert(id.to_string(), doc);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        let mut room = Document::new();
        room.insert("title".to_string(), json!("Loft"));
        store.put(Collection::Rooms, "r1", room).await.expect("put");

        assert!(store.get(Collection::Rooms, "r1").await.expect("get").is_some());
        assert!(store.get(Collection::Bookings, "r1").await.expect("get").is_none());
        assert!(store.scan(Collection::Users).await.expect("scan").is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        store
            .put(Collection::Users, "u1", Document::new())
            .await
            .expect("put");

        assert_eq!(other.count(Collection::Users).await.expect("count"), 1);
    }
}
