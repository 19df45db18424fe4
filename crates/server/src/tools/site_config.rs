//! site_config tool implementation.
//!
//! Returns the tenant's assembled configuration together with the load state.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use serde::Serialize;
use sitecfg_client::PublicSite;
use sitecfg_core::{LoadPhase, LoadState, SiteConfiguration, content_hash};

use super::json_result;

/// Serializable view of the coordinator's state.
#[derive(Debug, Clone, Serialize)]
pub struct LoadStateOutput {
    pub phase: LoadPhase,
    pub is_loading: bool,
    pub is_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub generation: u64,
}

impl From<LoadState> for LoadStateOutput {
    fn from(state: LoadState) -> Self {
        Self {
            phase: state.phase,
            is_loading: state.is_loading(),
            is_loaded: state.is_loaded(),
            last_error: state.last_error.map(|e| e.to_string()),
            generation: state.generation,
        }
    }
}

/// Output structure for site_config.
#[derive(Debug, Clone, Serialize)]
pub struct SiteConfigOutput {
    pub tenant_id: String,
    /// Load state after the load settled.
    pub state: LoadStateOutput,
    /// The assembled configuration; absent when the load failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<SiteConfiguration>,
    /// Hash of the configuration currently applied to the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_hash: Option<String>,
}

/// Implementation of the site_config tool.
///
/// A failed load is reported through `state.last_error` rather than as a tool error.
pub async fn config_impl(site: &PublicSite) -> Result<CallToolResult, McpError> {
    let configuration = match site.load().await {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::debug!(tenant = site.tenant_id(), error = %e, "configuration unavailable");
            None
        }
    };
    let applied_hash = site.applied().await.and_then(|applied| content_hash(&applied).ok());

    json_result(&SiteConfigOutput {
        tenant_id: site.tenant_id().to_string(),
        state: site.coordinator().state().into(),
        configuration,
        applied_hash,
    })
}
