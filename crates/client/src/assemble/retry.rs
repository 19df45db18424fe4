//! Per-fetch deadline with bounded retry.

use std::future::Future;
use std::time::Duration;

use sitecfg_core::{AppConfig, Error};

/// Deadline and retry budget applied to every store round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Wait bound for a single attempt (default: 10s).
    pub timeout: Duration,
    /// Retries after the first attempt (default: 3).
    pub max_retries: u32,
    /// Fixed delay between attempts (default: 1s).
    pub backoff: Duration,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(10), max_retries: 3, backoff: Duration::from_secs(1) }
    }
}

impl FetchPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self { timeout: config.fetch_timeout(), max_retries: config.fetch_retries, backoff: config.retry_backoff() }
    }
}

/// Run `op` under the policy's deadline, retrying retryable failures.
///
/// An attempt that outlives `policy.timeout` counts as [`Error::Timeout`], as
/// does a timeout reported by the store itself. Other errors are returned
/// immediately. After `max_retries + 1` timed-out attempts the last timeout is
/// returned.
pub async fn with_timeout_retry<T, F, Fut>(policy: &FetchPolicy, label: &str, mut op: F) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Error>>,
{
    let attempts = policy.max_retries + 1;
    let mut attempt = 1;

    loop {
        let result = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(format!("{label} exceeded {}ms", policy.timeout.as_millis()))),
        };

        match result {
            Err(err) if err.is_retryable() && attempt < attempts => {
                tracing::warn!(fetch = label, attempt, max_attempts = attempts, error = %err, "retrying fetch");
                tokio::time::sleep(policy.backoff).await;
                attempt += 1;
            }
            Err(err) if err.is_retryable() => {
                tracing::warn!(fetch = label, attempts, "fetch retry budget exhausted");
                return Err(Error::Timeout(format!("{label}: no response after {attempts} attempts")));
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use futures_util::FutureExt;
    use futures_util::future::BoxFuture;

    /// Attempts hang forever until `hangs` calls have been made.
    fn hanging_for(calls: Arc<AtomicU32>, hangs: u32) -> impl FnMut() -> BoxFuture<'static, Result<u32, Error>> {
        move || {
            let calls = calls.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < hangs {
                    std::future::pending::<()>().await;
                }
                Ok(n)
            }
            .boxed()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_two_timeouts() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = tokio::time::Instant::now();

        let result = with_timeout_retry(&FetchPolicy::default(), "parent", hanging_for(calls.clone(), 2)).await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // two 10s deadlines plus two 1s backoffs
        assert_eq!(started.elapsed(), Duration::from_secs(22));
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_budget() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = with_timeout_retry(&FetchPolicy::default(), "parent", hanging_for(calls.clone(), 4)).await;

        assert!(matches!(result, Err(Error::Timeout(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_is_retried() {
        let calls = AtomicU32::new(0);

        let result = with_timeout_retry(&FetchPolicy::default(), "cores", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n == 0 { Err(Error::Timeout("deadline exceeded".into())) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), Error> = with_timeout_retry(&FetchPolicy::default(), "produtos", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Error::RemoteStore("permission denied".into())) }
        })
        .await;

        assert!(matches!(result, Err(Error::RemoteStore(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let config = AppConfig { fetch_timeout_ms: 500, fetch_retries: 1, retry_backoff_ms: 50, ..Default::default() };
        let policy = FetchPolicy::from_config(&config);
        assert_eq!(policy.timeout, Duration::from_millis(500));
        assert_eq!(policy.max_retries, 1);
        assert_eq!(policy.backoff, Duration::from_millis(50));
    }
}
