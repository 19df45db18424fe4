//! Core types and shared functionality for sitecfg.
//!
//! This crate provides:
//! - Typed site configuration model
//! - Section-scoped TTL cache and canonical content hashing
//! - Single-flight load coordinator
//! - Remote document store contract
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
mod lock;
pub mod model;
pub mod store;

pub use cache::{TtlCache, content_hash};
pub use config::{AppConfig, ConfigError, StoreBackend};
pub use coordinator::{LoadCoordinator, LoadHandle, LoadPhase, LoadState, SubscriptionId};
pub use error::Error;
pub use model::SiteConfiguration;
pub use store::{Record, RemoteStore, StoredDocument};
