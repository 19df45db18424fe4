//! MCP tool implementations.
//!
//! This module contains all tools exposed by the sitecfg server.

pub mod cache;
pub mod site_config;
pub mod site_reload;
pub mod site_render;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use serde::Serialize;
use sitecfg_core::Error;

pub use cache::{CacheGetParams, CachePurgeParams};
pub use site_reload::SiteReloadParams;

/// Pretty JSON text result.
fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}
