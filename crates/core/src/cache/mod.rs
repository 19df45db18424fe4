//! In-memory caching for remote fetch results.
//!
//! - Section-scoped TTL cache with lazy and swept eviction
//! - Canonical content hashing used to detect unchanged configuration

pub mod hash;
pub mod ttl;

pub use hash::content_hash;
pub use ttl::{DEFAULT_TTL, EntryInfo, TtlCache};
