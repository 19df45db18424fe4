//! cache_purge tool implementation.
//!
//! Clears one cache section, or sweeps expired entries from every section.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitecfg_client::PublicSite;

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove every entry of this section regardless of age.
    /// Without it, only expired entries are removed.
    #[serde(default)]
    pub section: Option<String>,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: usize,
    /// Entries left in the cache.
    pub remaining: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(site: &PublicSite, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    let cache = site.assembler().cache();
    let deleted = match params.section.as_deref() {
        Some(section) => cache.clear_section(section),
        None => cache.cleanup(),
    };

    tracing::info!(section = params.section.as_deref(), deleted, "purged cache entries");
    json_result(&CachePurgeOutput { deleted, remaining: cache.len() })
}
