//! Persistent document store backed by sled
//!
//! Each collection is a sled tree named `<namespace>.<collection>`. Values
//! are the JSON-serialized documents, keys are their `_id`.

use async_trait::async_trait;
use sled::{Db, Tree};
use std::path::Path;

use super::{Collection, Document, DocumentStore};
use crate::error::Result;

#[derive(Clone)]
pub struct DiskStore {
    db: Db,
    users: Tree,
    rooms: Tree,
    bookings: Tree,
}

impl DiskStore {
    /// Open or create the database at `path`
    pub fn open(path: &Path, namespace: &str) -> Result<Self> {
        Self::from_db(sled::open(path)?, namespace)
    }

    /// Bind the namespace's collection trees on an already opened database
    pub fn from_db(db: Db, namespace: &str) -> Result<Self> {
        let tree = |collection: Collection| db.open_tree(format!("{}.{}", namespace, collection));
        Ok(Self {
            users: tree(Collection::Users)?,
            rooms: tree(Collection::Rooms)?,
            bookings: tree(Collection::Bookings)?,
            db,
        })
    }

    fn tree(&self, collection: Collection) -> &Tree {
        match collection {
            Collection::Users => &self.users,
            Collection::Rooms => &self.rooms,
            Collection::Bookings => &self.bookings,
        }
    }
}

#[async_trait]
impl DocumentStore for DiskStore {
    async fn scan(&self, collection: Collection) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for entry in self.tree(collection).iter() {
            let (_, bytes) = entry?;
            docs.push(serde_json::from_slice(&bytes)?);
        }
        Ok(docs)
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>> {
        match self.tree(collection).get(id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, collection: Collection, id: &str, doc: Document) -> Result<()> {
        let bytes = serde_json::to_vec(&doc)?;
        self.tree(collection).insert(id.as_bytes(), bytes)?;
        Ok(())
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        Ok(self.tree(collection).len() as u64)
    }

    async fn ping(&self) -> Result<()> {
        self.db.size_on_disk()?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let flushed = self.db.flush()?;
        tracing::info!("Flushed {} bytes to the document store", flushed);
        Ok(())
    }
}
