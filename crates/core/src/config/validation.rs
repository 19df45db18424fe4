//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `tenant_id` or `root_collection` is empty or contains `/`
    /// - `cache_ttl_ms` is below 1s or above 24 hours
    /// - `fetch_timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `fetch_retries` exceeds 10
    /// - `retry_backoff_ms` exceeds 1 minute
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("tenant_id", &self.tenant_id), ("root_collection", &self.root_collection)] {
            if value.is_empty() {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not be empty".into() });
            }
            if value.contains('/') {
                return Err(ConfigError::Invalid { field: field.into(), reason: "must not contain '/'".into() });
            }
        }

        if self.cache_ttl_ms < 1_000 {
            return Err(ConfigError::Invalid { field: "cache_ttl_ms".into(), reason: "must be at least 1s".into() });
        }
        if self.cache_ttl_ms > 86_400_000 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_ms".into(),
                reason: "must not exceed 24 hours (86400000ms)".into(),
            });
        }
        if self.cache_sweep_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_sweep_interval_ms".into(),
                reason: "must be greater than 0".into(),
            });
        }

        if self.fetch_timeout_ms < 100 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must be at least 100ms".into(),
            });
        }
        if self.fetch_timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "fetch_timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }
        if self.fetch_retries > 10 {
            return Err(ConfigError::Invalid { field: "fetch_retries".into(), reason: "must not exceed 10".into() });
        }
        if self.retry_backoff_ms > 60_000 {
            return Err(ConfigError::Invalid {
                field: "retry_backoff_ms".into(),
                reason: "must not exceed 1 minute (60000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.firestore_project.is_some() && self.seed_file.is_some() {
            tracing::warn!(
                firestore_project = ?self.firestore_project,
                seed_file = ?self.seed_file,
                "Both firestore_project and seed_file are set; \
                 the Firestore backend takes precedence"
            );
        }

        Ok(())
    }
}
