//! site_render tool implementation.
//!
//! Loads the tenant's configuration (joining a load in flight), applies it and
//! returns the public page. A failed load yields the fallback page.

use chrono::Utc;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sitecfg_client::{PublicSite, RenderedPage};

use super::json_result;

/// Section that failed to apply.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SectionFailureOutput {
    pub section: String,
    pub reason: String,
}

/// Output structure for site_render and site_reload.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SiteRenderOutput {
    /// The tenant the page was rendered for.
    pub tenant_id: String,
    /// The rendered HTML page.
    pub html: String,
    /// Whether the fallback page was served.
    pub fallback: bool,
    /// Why the fallback page was served.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    /// The configuration was unchanged and nothing was re-applied.
    pub skipped: bool,
    /// Sections written to the page.
    pub applied: Vec<String>,
    /// Sections that failed to apply.
    pub failed: Vec<SectionFailureOutput>,
    /// ISO8601 timestamp of the render.
    pub rendered_at: String,
}

impl SiteRenderOutput {
    pub fn new(tenant_id: &str, page: RenderedPage) -> Self {
        let RenderedPage { html, report, fallback_reason } = page;
        Self {
            tenant_id: tenant_id.to_string(),
            html,
            fallback: fallback_reason.is_some(),
            fallback_reason,
            skipped: report.skipped,
            applied: report.applied.iter().map(ToString::to_string).collect(),
            failed: report
                .failed
                .into_iter()
                .map(|f| SectionFailureOutput { section: f.section.to_string(), reason: f.reason })
                .collect(),
            rendered_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Implementation of the site_render tool.
pub async fn render_impl(site: &PublicSite) -> Result<CallToolResult, McpError> {
    let page = site.render().await?;
    json_result(&SiteRenderOutput::new(site.tenant_id(), page))
}
