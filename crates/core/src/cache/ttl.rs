//! Section-scoped in-memory cache with per-entry TTL.
//!
//! Entries live under a composite `section:key` and expire independently.
//! Reads evict lazily; [`TtlCache::cleanup`] is the active sweep and is meant
//! to be driven by the caller on a timer. The cache has no size bound.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::ttl";

/// Default lifetime of a cache entry (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    section: String,
    value: V,
    inserted_at: Instant,
    inserted_at_utc: DateTime<Utc>,
}

impl<V> CacheEntry<V> {
    fn remaining(&self, ttl: Duration) -> Duration {
        ttl.saturating_sub(self.inserted_at.elapsed())
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.remaining(ttl).is_zero()
    }
}

/// Inspection metadata for a live cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct EntryInfo {
    pub section: String,
    pub key: String,
    /// RFC 3339 wall-clock time of insertion.
    pub inserted_at: String,
    pub remaining_ttl_ms: u64,
}

/// Shared in-memory cache handle.
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

fn composite_key(section: &str, key: &str) -> String {
    format!("{section}:{key}")
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache with the default 5 minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self { entries: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `value` under `section:key`, replacing any previous entry.
    pub fn set(&self, section: &str, key: &str, value: V) {
        let entry =
            CacheEntry { section: section.to_string(), value, inserted_at: Instant::now(), inserted_at_utc: Utc::now() };
        rw_write(&self.entries, SOURCE, "set").insert(composite_key(section, key), entry);
    }

    /// Return the value if it is still fresh.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&self, section: &str, key: &str) -> Option<V> {
        let composite = composite_key(section, key);
        let mut entries = rw_write(&self.entries, SOURCE, "get");

        match entries.get(&composite) {
            None => return None,
            Some(entry) if !entry.is_expired(self.ttl) => {
                tracing::debug!(section, key, "cache hit");
                return Some(entry.value.clone());
            }
            Some(_) => {}
        }

        entries.remove(&composite);
        tracing::debug!(section, key, "cache entry expired");
        None
    }

    /// Milliseconds of life left for `section:key`; zero when absent or expired.
    pub fn remaining_ttl(&self, section: &str, key: &str) -> Duration {
        rw_read(&self.entries, SOURCE, "remaining_ttl")
            .get(&composite_key(section, key))
            .map(|entry| entry.remaining(self.ttl))
            .unwrap_or(Duration::ZERO)
    }

    /// Metadata for a fresh entry, or `None` when absent or expired.
    pub fn entry_info(&self, section: &str, key: &str) -> Option<EntryInfo> {
        let entries = rw_read(&self.entries, SOURCE, "entry_info");
        let entry = entries.get(&composite_key(section, key))?;
        if entry.is_expired(self.ttl) {
            return None;
        }

        Some(EntryInfo {
            section: section.to_string(),
            key: key.to_string(),
            inserted_at: entry.inserted_at_utc.to_rfc3339(),
            remaining_ttl_ms: entry.remaining(self.ttl).as_millis() as u64,
        })
    }

    /// Remove every expired entry.
    ///
    /// Returns the number of removed entries.
    pub fn cleanup(&self) -> usize {
        let mut entries = rw_write(&self.entries, SOURCE, "cleanup");
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        before - entries.len()
    }

    /// Remove every entry of `section`, fresh or not.
    ///
    /// Returns the number of removed entries.
    pub fn clear_section(&self, section: &str) -> usize {
        let mut entries = rw_write(&self.entries, SOURCE, "clear_section");
        let before = entries.len();
        entries.retain(|_, entry| entry.section != section);
        before - entries.len()
    }

    /// Remove everything.
    pub fn clear(&self) {
        rw_write(&self.entries, SOURCE, "clear").clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        rw_read(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn test_set_then_get() {
        let cache = TtlCache::new();
        cache.set("cores", "acme", "#112233".to_string());
        assert_eq!(cache.get("cores", "acme").as_deref(), Some("#112233"));
        assert_eq!(cache.remaining_ttl("cores", "acme"), DEFAULT_TTL);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_missing() {
        let cache: TtlCache<u32> = TtlCache::new();
        assert!(cache.get("cores", "acme").is_none());
        assert_eq!(cache.remaining_ttl("cores", "acme"), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_is_evicted_on_read() {
        let cache = TtlCache::with_ttl(Duration::from_secs(10));
        cache.set("contato", "acme", 1u32);

        advance(Duration::from_secs(4)).await;
        assert_eq!(cache.remaining_ttl("contato", "acme"), Duration::from_secs(6));
        assert_eq!(cache.get("contato", "acme"), Some(1));

        advance(Duration::from_secs(6)).await;
        assert_eq!(cache.remaining_ttl("contato", "acme"), Duration::ZERO);
        assert!(cache.get("contato", "acme").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overwrite_restarts_ttl() {
        let cache = TtlCache::with_ttl(Duration::from_secs(10));
        cache.set("cores", "acme", 1u32);
        advance(Duration::from_secs(8)).await;
        cache.set("cores", "acme", 2u32);
        advance(Duration::from_secs(8)).await;

        assert_eq!(cache.get("cores", "acme"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_section_leaves_other_sections() {
        let cache = TtlCache::new();
        cache.set("produtos", "acme", 1u32);
        cache.set("produtos", "globex", 2u32);
        cache.set("cores", "acme", 3u32);

        assert_eq!(cache.clear_section("produtos"), 2);
        assert!(cache.get("produtos", "acme").is_none());
        assert!(cache.get("produtos", "globex").is_none());
        assert_eq!(cache.get("cores", "acme"), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_section_does_not_match_key_prefixes() {
        let cache = TtlCache::new();
        cache.set("produtos", "x", 1u32);
        cache.set("produtos:x", "y", 2u32);

        assert_eq!(cache.clear_section("produtos"), 1);
        assert_eq!(cache.get("produtos:x", "y"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cleanup_sweeps_only_expired() {
        let cache = TtlCache::with_ttl(Duration::from_secs(10));
        cache.set("cores", "old", 1u32);
        advance(Duration::from_secs(7)).await;
        cache.set("cores", "new", 2u32);
        advance(Duration::from_secs(5)).await;

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.cleanup(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("cores", "new"), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_growth_is_unbounded() {
        let cache = TtlCache::new();
        for i in 0..1_000u32 {
            cache.set("produtos", &i.to_string(), i);
        }
        assert_eq!(cache.len(), 1_000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_info() {
        let cache = TtlCache::with_ttl(Duration::from_secs(10));
        cache.set("sobre", "acme", ());
        advance(Duration::from_secs(3)).await;

        let info = cache.entry_info("sobre", "acme").unwrap();
        assert_eq!(info.section, "sobre");
        assert_eq!(info.remaining_ttl_ms, 7_000);
        assert!(chrono::DateTime::parse_from_rfc3339(&info.inserted_at).is_ok());

        advance(Duration::from_secs(7)).await;
        assert!(cache.entry_info("sobre", "acme").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_entries() {
        let cache = TtlCache::new();
        let other = cache.clone();
        cache.set("cores", "acme", 5u32);
        assert_eq!(other.get("cores", "acme"), Some(5));
    }
}
