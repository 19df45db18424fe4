//! In-memory document store.
//!
//! Collections keep insertion order, so a scan returns documents in the order
//! they were first written. Used by tests and for serving a site from a JSON
//! seed file.
//!
//! ### Seed format
//!
//! ```json
//! {
//!   "configuracoes": { "gsm": { "empresaNome": "GSM" } },
//!   "configuracoes/gsm/cores": { "data": { "primary": "#0a84ff" } },
//!   "configuracoes/gsm/produtos": { "p1": { "nome": "Tela" } }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use sitecfg_core::{Error, Record, RemoteStore, StoredDocument};
use tokio::sync::RwLock;

/// Document store held entirely in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<StoredDocument>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed document (see module docs).
    ///
    /// # Errors
    ///
    /// Returns `Error::Decode` if the seed is not an object of collections,
    /// each an object of documents, each an object.
    pub fn from_seed(seed: &Value) -> Result<Self, Error> {
        let collections = seed
            .as_object()
            .ok_or_else(|| Error::Decode("seed must be an object of collections".into()))?;

        let mut map: HashMap<String, Vec<StoredDocument>> = HashMap::new();
        for (collection, documents) in collections {
            let documents = documents
                .as_object()
                .ok_or_else(|| Error::Decode(format!("collection {collection} must be an object of documents")))?;

            let docs = map.entry(collection.clone()).or_default();
            for (id, data) in documents {
                let data = data
                    .as_object()
                    .cloned()
                    .ok_or_else(|| Error::Decode(format!("document {collection}/{id} must be an object")))?;
                docs.push(StoredDocument { id: id.clone(), data });
            }
        }

        Ok(Self { collections: Arc::new(RwLock::new(map)) })
    }

    /// Read and parse a JSON seed file.
    pub async fn from_seed_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::InvalidInput(format!("cannot read seed file {}: {e}", path.display())))?;
        let seed: Value = serde_json::from_slice(&bytes)?;
        let store = Self::from_seed(&seed)?;
        tracing::info!(path = %path.display(), "loaded seed file");
        Ok(store)
    }

    /// Insert or replace a document. A replaced document keeps its position.
    pub async fn insert(&self, collection: &str, id: &str, data: Record) {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.iter_mut().find(|d| d.id == id) {
            Some(existing) => existing.data = data,
            None => docs.push(StoredDocument { id: id.to_string(), data }),
        }
    }

    /// Returns whether the document existed.
    pub async fn remove(&self, collection: &str, id: &str) -> bool {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return false;
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        docs.len() != before
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Record>, Error> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .map(|d| d.data.clone()))
    }

    async fn get_collection(&self, collection: &str) -> Result<Vec<StoredDocument>, Error> {
        let collections = self.collections.read().await;
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }
}
