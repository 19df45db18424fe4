//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use std::sync::Arc;

use crate::tools::{
    CacheGetParams, CachePurgeParams, SiteReloadParams, cache, site_config::config_impl, site_reload::reload_impl,
    site_render::render_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use sitecfg_client::PublicSite;

/// The main MCP server handler for sitecfg.
#[derive(Clone)]
pub struct SiteServer {
    site: Arc<PublicSite>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SiteServer {
    /// Create a new server handler for one tenant's site.
    pub fn new(site: Arc<PublicSite>) -> Self {
        Self { site, tool_router: Self::tool_router() }
    }

    #[tool(
        description = "Render the tenant's public page as HTML. Serves the fallback page when the configuration cannot be loaded."
    )]
    async fn site_render(&self) -> Result<CallToolResult, McpError> {
        render_impl(&self.site).await
    }

    #[tool(description = "Return the tenant's assembled site configuration and the current load state.")]
    async fn site_config(&self) -> Result<CallToolResult, McpError> {
        config_impl(&self.site).await
    }

    #[tool(description = "Discard the loaded configuration, optionally clear cache sections, and render the page again.")]
    async fn site_reload(&self, params: Parameters<SiteReloadParams>) -> Result<CallToolResult, McpError> {
        reload_impl(&self.site, params.0).await
    }

    #[tool(description = "Inspect a cached fetch: insertion time and remaining TTL for a section and key.")]
    async fn cache_get(&self, params: Parameters<CacheGetParams>) -> Result<CallToolResult, McpError> {
        cache::get_impl(&self.site, params.0).await
    }

    #[tool(description = "Clear one cache section, or remove expired entries when no section is given.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        cache::purge_impl(&self.site, params.0).await
    }
}

impl ServerHandler for SiteServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sitecfg".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(format!(
                "Site configuration for tenant '{}'. Use site_render for the public page and site_reload after editing the store.",
                self.site.tenant_id()
            )),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
