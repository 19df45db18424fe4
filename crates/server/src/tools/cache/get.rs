//! cache_get tool implementation.
//!
//! Reports insertion time and remaining TTL of a cached fetch.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitecfg_client::{CachedFetch, PublicSite};
use sitecfg_core::{Error, cache::EntryInfo};

use crate::tools::json_result;

/// Parameters for the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetParams {
    /// Cache section (config, cores, contato, modulos, sobre, produtos).
    pub section: String,

    /// Entry key; defaults to the served tenant id.
    #[serde(default)]
    pub key: Option<String>,
}

/// Output from the cache_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheGetOutput {
    /// Entry metadata.
    pub entry: EntryInfo,
    /// "document", "missing_document" or "collection".
    pub kind: String,
    /// Number of cached documents.
    pub documents: usize,
}

/// Implementation of the cache_get tool.
pub async fn get_impl(site: &PublicSite, params: CacheGetParams) -> Result<CallToolResult, McpError> {
    let key = params.key.as_deref().unwrap_or(site.tenant_id());
    let cache = site.assembler().cache();
    let miss = || Error::CacheMiss(format!("{}:{key}", params.section));

    let value = cache.get(&params.section, key).ok_or_else(miss)?;
    let entry = cache.entry_info(&params.section, key).ok_or_else(miss)?;
    let (kind, documents) = match value {
        CachedFetch::Document(Some(_)) => ("document", 1),
        CachedFetch::Document(None) => ("missing_document", 0),
        CachedFetch::Collection(docs) => ("collection", docs.len()),
    };

    json_result(&CacheGetOutput { entry, kind: kind.to_string(), documents })
}
