//! Document store
//!
//! Collections hold schema-flexible JSON documents keyed by `_id`. Query
//! and update semantics live on the [`DocumentStore`] trait so every
//! backend only has to provide keyed reads, writes and scans.

mod disk;
pub mod filter;
mod memory;

pub use disk::DiskStore;
pub use filter::Filter;
pub use memory::MemoryStore;

use filter::apply_set;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};

/// A stored record
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Field holding a document's generated identifier
pub const ID_FIELD: &str = "_id";

/// Shared handle injected into handlers and guards
pub type SharedStore = Arc<dyn DocumentStore>;

/// The fixed logical collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Rooms,
    Bookings,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Rooms => "rooms",
            Collection::Bookings => "bookings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of an insert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: String,
}

/// Outcome of an update or upsert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_id: Option<String>,
    pub upserted_count: u64,
}

impl UpdateResult {
    fn matched(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_id: None,
            upserted_count: 0,
        }
    }

    fn upserted(id: String) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
            upserted_count: 1,
        }
    }

    fn unmatched() -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: None,
            upserted_count: 0,
        }
    }
}

/// Generate a new time-ordered document id
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Validate an id taken from a request path
pub fn parse_id(raw: &str) -> Result<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|e| Error::InvalidId(format!("{}: {}", raw, e)))
}

/// Return the document's id, assigning a fresh one when absent
fn ensure_id(doc: &mut Document) -> String {
    match doc.get(ID_FIELD).and_then(|v| v.as_str()) {
        Some(id) => id.to_string(),
        None => {
            let id = new_id();
            doc.insert(ID_FIELD.to_string(), id.clone().into());
            id
        }
    }
}

/// Storage-access interface for the three collections.
///
/// Implementations are safe for concurrent use. Read-modify-write
/// operations are not atomic across requests: the last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in a collection, in id order
    async fn scan(&self, collection: Collection) -> Result<Vec<Document>>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>>;

    /// Insert or replace the document stored under `id`
    async fn put(&self, collection: Collection, id: &str, doc: Document) -> Result<()>;

    /// Confirm the backend is reachable
    async fn ping(&self) -> Result<()>;

    /// Flush and release the backend
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        Ok(self
            .scan(collection)
            .await?
            .into_iter()
            .filter(|doc| filter.matches(doc))
            .collect())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        if let Some(id) = filter.id() {
            return self.get(collection, id).await;
        }
        Ok(self
            .scan(collection)
            .await?
            .into_iter()
            .find(|doc| filter.matches(doc)))
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        Ok(self.scan(collection).await?.len() as u64)
    }

    async fn insert_one(&self, collection: Collection, mut doc: Document) -> Result<InsertOneResult> {
        let id = ensure_id(&mut doc);
        self.put(collection, &id, doc).await?;
        Ok(InsertOneResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    /// Apply `set` to the first match. With `upsert`, a miss inserts the
    /// filter's equality fields plus `set` as a new document.
    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult> {
        match self.find_one(collection, filter).await? {
            Some(mut doc) => {
                let modified = apply_set(&mut doc, set);
                if modified {
                    let id = ensure_id(&mut doc);
                    self.put(collection, &id, doc).await?;
                }
                Ok(UpdateResult::matched(modified))
            }
            None if upsert => {
                let mut doc = filter.seed();
                apply_set(&mut doc, set);
                let id = ensure_id(&mut doc);
                self.put(collection, &id, doc).await?;
                Ok(UpdateResult::upserted(id))
            }
            None => Ok(UpdateResult::unmatched()),
        }
    }
}

/// Open the backend selected by configuration
pub fn open(config: &DatabaseConfig) -> Result<SharedStore> {
    if config.is_memory() {
        tracing::info!("Using in-memory document store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    tracing::info!(
        "Opening document store at {} (namespace {})",
        config.path.display(),
        config.namespace
    );
    Ok(Arc::new(DiskStore::open(&config.path, &config.namespace)?))
}
