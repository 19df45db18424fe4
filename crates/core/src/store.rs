//! Remote document store contract.
//!
//! The store is schemaless: documents are opaque JSON records that the
//! assembler decodes into typed sections.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Error;

/// An opaque document payload.
pub type Record = Map<String, Value>;

/// A document returned by a collection scan: store-assigned id plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub data: Record,
}

/// Read access to a remote document database.
///
/// Collection paths use `/` separators, e.g. `configuracoes/acme/produtos`.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Fetch one document by id.
    ///
    /// Returns `Ok(None)` when the document does not exist.
    async fn get_document(&self, collection: &str, id: &str) -> Result<Option<Record>, Error>;

    /// Fetch every document of a collection, in store iteration order.
    async fn get_collection(&self, collection: &str) -> Result<Vec<StoredDocument>, Error>;
}
