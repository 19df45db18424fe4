//! Periodic removal of expired cache entries.

use std::time::Duration;

use sitecfg_core::TtlCache;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn a task that calls [`TtlCache::cleanup`] every `period`.
pub fn spawn_sweeper<V>(cache: TtlCache<V>, period: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            let removed = cache.cleanup();
            if removed > 0 {
                tracing::debug!(removed, remaining = cache.len(), "swept expired cache entries");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let cache: TtlCache<u32> = TtlCache::with_ttl(Duration::from_secs(1));
        cache.set("config", "acme", 1);
        let sweeper = spawn_sweeper(cache.clone(), Duration::from_millis(500));

        tokio::time::sleep(Duration::from_millis(1600)).await;

        assert!(cache.is_empty());
        sweeper.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_keeps_fresh_entries() {
        let cache: TtlCache<u32> = TtlCache::with_ttl(Duration::from_secs(60));
        cache.set("config", "acme", 1);
        let sweeper = spawn_sweeper(cache.clone(), Duration::from_millis(500));

        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(cache.len(), 1);
        sweeper.abort();
    }
}
