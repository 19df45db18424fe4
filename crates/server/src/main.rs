//! sitecfg server entry point.
//!
//! This is the main binary that boots the MCP server on stdio transport.
//! Logging goes to stderr to avoid interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::Result;
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use sitecfg_client::{ConfigAssembler, FirestoreConfig, FirestoreStore, MemoryStore, PublicSite};
use sitecfg_core::{AppConfig, RemoteStore, StoreBackend, TtlCache};
use tracing_subscriber::EnvFilter;

mod handler;
mod sweep;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    tracing::info!(tenant = %config.tenant_id, "Starting sitecfg server on stdio transport");

    let store = open_store(&config).await?;
    let cache = TtlCache::with_ttl(config.cache_ttl());
    let assembler = ConfigAssembler::from_config(store, cache.clone(), &config);
    let site = Arc::new(PublicSite::new(config.tenant_id.clone(), Arc::new(assembler)));

    site.coordinator().subscribe(|state| {
        tracing::info!(
            phase = ?state.phase,
            generation = state.generation,
            error = state.last_error.as_ref().map(ToString::to_string),
            "site load state changed"
        );
    });

    let sweeper = sweep::spawn_sweeper(cache, config.cache_sweep_interval());

    let handler = handler::SiteServer::new(site);
    let transport = stdio();
    let server = serve_server(handler, transport).await?;

    server.waiting().await?;
    sweeper.abort();

    Ok(())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn RemoteStore>> {
    match config.store_backend() {
        StoreBackend::Firestore { project, api_key, base_url } => {
            tracing::info!(%project, "using Firestore store");
            let store = FirestoreStore::new(FirestoreConfig {
                api_key,
                base_url,
                timeout: config.fetch_timeout(),
                user_agent: config.user_agent.clone(),
                ..FirestoreConfig::new(project)
            })?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory { seed_file: Some(path) } => Ok(Arc::new(MemoryStore::from_seed_file(&path).await?)),
        StoreBackend::Memory { seed_file: None } => {
            tracing::warn!("no store configured; every render will serve the fallback page");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
