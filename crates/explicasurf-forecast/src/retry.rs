//! Retry with exponential backoff for forecast requests.
//!
//! Only transient failures are retried: timeouts, refused connections,
//! 5xx, 408 and 429. Anything else returns on the first attempt.

use std::future::Future;
use std::time::Duration;

use explicasurf_core::BackendConfig;

use crate::error::ForecastError;

pub const DEFAULT_INITIAL_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: u32,
    /// Delay before the first retry (doubles each attempt)
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, DEFAULT_INITIAL_DELAY_MS, DEFAULT_MAX_DELAY_MS)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_retries,
            initial_delay: Duration::from_millis(initial_delay_ms),
            max_delay: Duration::from_millis(max_delay_ms),
        }
    }

    /// Single attempt, no backoff.
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    pub fn from_backend(config: &BackendConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            ..Self::default()
        }
    }

    /// Backoff before retry number `attempt` (0-based), capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails permanently, or retries run out.
///
/// # Errors
///
/// The first non-retryable error, or the last error once every attempt is used.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, operation: F) -> Result<T, ForecastError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ForecastError>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!("Forecast request succeeded after {} retries", attempt);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_retries => {
                let delay = policy.delay_for_attempt(attempt);
                attempt += 1;
                tracing::warn!(
                    "Retryable error ({}), attempt {} of {} in {:?}",
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!("All {} forecast attempts failed", policy.max_retries + 1);
                } else {
                    tracing::debug!("Non-retryable forecast error: {}", e);
                }
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> ForecastError {
        ForecastError::Status {
            status: 503,
            body: "waking up".to_string(),
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 1000);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(40), Duration::from_millis(1000));
    }

    #[test]
    fn test_policy_from_backend() {
        let config = BackendConfig {
            base_url: "http://localhost".to_string(),
            timeout_secs: 5,
            max_retries: 4,
        };
        assert_eq!(RetryPolicy::from_backend(&config).max_retries, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_then_succeeds() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result = with_retry(RetryPolicy::new(3, 100, 1000), move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(unavailable())
            } else {
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = with_retry(RetryPolicy::new(2, 100, 1000), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(unavailable())
        })
        .await;

        assert!(matches!(result, Err(ForecastError::Status { status: 503, .. })));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;

        let result: Result<(), _> = with_retry(RetryPolicy::new(3, 1, 1), move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ForecastError::Status {
                status: 404,
                body: String::new(),
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
