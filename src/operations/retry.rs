//! Flat-delay retry loop for remote calls that can race the service's consistency window

use crate::error::{BridgeError, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 2;
const RETRY_DELAY_MS: u64 = 1000;

/// Retry configuration: total attempts and the fixed delay slept after each retryable failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            delay_ms: RETRY_DELAY_MS,
        }
    }
}

impl RetryConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or the attempt budget
/// is spent.
///
/// The delay is flat: every retry waits `config.delay_ms`. When the budget is exhausted the last
/// retryable error is returned unchanged so the caller can decide how to classify it.
pub async fn retry_flat<T, F, Fut, P>(
    config: &RetryConfig,
    what: &str,
    mut operation: F,
    is_retryable: P,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&BridgeError) -> bool,
{
    let attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if is_retryable(&e) => {
                if attempt >= attempts {
                    info!("{} still failing after {} attempts", what, attempts);
                    return Err(e);
                }
                warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {}ms",
                    what, attempt, attempts, e, config.delay_ms
                );
                tokio::time::sleep(config.delay()).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            delay_ms: 0,
        }
    }

    #[test]
    fn test_default_budget() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.delay(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_succeeds_after_retryable_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_flat(
            &fast(2),
            "op",
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(BridgeError::transport(404, "race"))
                } else {
                    Ok(7)
                }
            },
            |_| true,
        )
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_budget_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_flat(
            &fast(2),
            "op",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(BridgeError::transport(404, "race"))
            },
            |_| true,
        )
        .await;
        assert_eq!(result.unwrap_err().status(), Some(404));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_flat(
            &fast(5),
            "op",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(BridgeError::transport(500, "boom"))
            },
            |e| e.status() == Some(404),
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
