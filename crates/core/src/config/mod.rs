//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SITECFG_*)
//! 2. TOML config file (if SITECFG_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SITECFG_*)
/// 2. TOML config file (if SITECFG_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Tenant whose site configuration is loaded.
    ///
    /// Set via SITECFG_TENANT_ID environment variable.
    #[serde(default = "default_tenant_id")]
    pub tenant_id: String,

    /// Root collection holding one parent document per tenant.
    ///
    /// Set via SITECFG_ROOT_COLLECTION environment variable.
    #[serde(default = "default_root_collection")]
    pub root_collection: String,

    /// JSON seed file for the in-memory store.
    ///
    /// Set via SITECFG_SEED_FILE environment variable. Ignored when a
    /// Firestore project is configured.
    #[serde(default)]
    pub seed_file: Option<PathBuf>,

    /// Firestore project id. Selects the Firestore REST backend when set.
    ///
    /// Set via SITECFG_FIRESTORE_PROJECT environment variable.
    #[serde(default)]
    pub firestore_project: Option<String>,

    /// Firestore web API key, sent as the `key` query parameter.
    ///
    /// Set via SITECFG_FIRESTORE_API_KEY environment variable.
    #[serde(default)]
    pub firestore_api_key: Option<String>,

    /// Base URL of the Firestore REST API.
    ///
    /// Set via SITECFG_FIRESTORE_BASE_URL environment variable.
    #[serde(default = "default_firestore_base_url")]
    pub firestore_base_url: String,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SITECFG_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Lifetime of cached fetch results in milliseconds.
    ///
    /// Set via SITECFG_CACHE_TTL_MS environment variable.
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,

    /// Interval of the background sweep that drops expired cache entries.
    ///
    /// Set via SITECFG_CACHE_SWEEP_INTERVAL_MS environment variable.
    #[serde(default = "default_cache_sweep_interval_ms")]
    pub cache_sweep_interval_ms: u64,

    /// Deadline for each individual remote fetch in milliseconds.
    ///
    /// Set via SITECFG_FETCH_TIMEOUT_MS environment variable.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// How many times a timed-out fetch is retried.
    ///
    /// Set via SITECFG_FETCH_RETRIES environment variable.
    #[serde(default = "default_fetch_retries")]
    pub fetch_retries: u32,

    /// Fixed pause between retries in milliseconds.
    ///
    /// Set via SITECFG_RETRY_BACKOFF_MS environment variable.
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

/// Which [`crate::RemoteStore`] implementation the configuration selects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store, optionally seeded from a JSON file.
    Memory { seed_file: Option<PathBuf> },
    /// Firestore REST API.
    Firestore { project: String, api_key: Option<String>, base_url: String },
}

fn default_tenant_id() -> String {
    "gsm".into()
}

fn default_root_collection() -> String {
    "configuracoes".into()
}

fn default_firestore_base_url() -> String {
    "https://firestore.googleapis.com/v1".into()
}

fn default_user_agent() -> String {
    "sitecfg/0.1".into()
}

fn default_cache_ttl_ms() -> u64 {
    300_000 // 5 minutes
}

fn default_cache_sweep_interval_ms() -> u64 {
    60_000
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

fn default_fetch_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            tenant_id: default_tenant_id(),
            root_collection: default_root_collection(),
            seed_file: None,
            firestore_project: None,
            firestore_api_key: None,
            firestore_base_url: default_firestore_base_url(),
            user_agent: default_user_agent(),
            cache_ttl_ms: default_cache_ttl_ms(),
            cache_sweep_interval_ms: default_cache_sweep_interval_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            fetch_retries: default_fetch_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl AppConfig {
    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }

    /// Sweep interval as Duration.
    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.cache_sweep_interval_ms)
    }

    /// Per-fetch timeout as Duration for use with tokio.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Retry backoff as Duration.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// The store backend selected by this configuration.
    ///
    /// A configured Firestore project wins over a seed file.
    pub fn store_backend(&self) -> StoreBackend {
        match &self.firestore_project {
            Some(project) => StoreBackend::Firestore {
                project: project.clone(),
                api_key: self.firestore_api_key.clone(),
                base_url: self.firestore_base_url.clone(),
            },
            None => StoreBackend::Memory { seed_file: self.seed_file.clone() },
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SITECFG_`
    /// 2. TOML file from `SITECFG_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SITECFG_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SITECFG_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
