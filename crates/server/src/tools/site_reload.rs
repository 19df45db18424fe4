//! site_reload tool implementation.
//!
//! Resets the load coordinator, optionally drops cached fetches, and renders
//! the page again from a fresh load.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitecfg_client::{CACHE_SECTIONS, PublicSite};
use sitecfg_core::Error;

use super::json_result;
use super::site_render::SiteRenderOutput;

/// Input parameters for site_reload tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SiteReloadParams {
    /// Cache sections to clear before reloading
    /// (config, cores, contato, modulos, sobre, produtos).
    #[serde(default)]
    pub clear_sections: Vec<String>,

    /// Clear every cached fetch before reloading.
    #[serde(default)]
    pub clear_all: bool,
}

/// Output structure for site_reload tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteReloadOutput {
    /// Number of cache entries removed before reloading.
    pub cleared: usize,
    /// The page rendered from the reload.
    pub page: SiteRenderOutput,
}

/// Implementation of the site_reload tool.
pub async fn reload_impl(site: &PublicSite, params: SiteReloadParams) -> Result<CallToolResult, McpError> {
    if let Some(unknown) = params.clear_sections.iter().find(|s| !CACHE_SECTIONS.contains(&s.as_str())) {
        return Err(Error::InvalidInput(format!(
            "unknown cache section {unknown:?}; expected one of {}",
            CACHE_SECTIONS.join(", ")
        ))
        .into());
    }

    let cache = site.assembler().cache();
    let cleared = if params.clear_all {
        let count = cache.len();
        cache.clear();
        count
    } else {
        params.clear_sections.iter().map(|section| cache.clear_section(section)).sum()
    };

    tracing::info!(tenant = site.tenant_id(), cleared, "reloading site configuration");
    let page = site.reload().await?;

    json_result(&SiteReloadOutput { cleared, page: SiteRenderOutput::new(site.tenant_id(), page) })
}
