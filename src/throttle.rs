//! Request throttling and retry for the provider clients.
//!
//! Each provider gets its own [`Throttle`] enforcing a minimum interval
//! between requests (60s / requests-per-minute). This is a single-flight
//! gate, not a token bucket: bursts are never permitted even when a quota
//! window would allow them.

use crate::error::ApiError;
use governor::{Quota, RateLimiter};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::warn;

/// Per-provider retry policy for transient failures.
///
/// Only network errors and 5xx responses are retried; 4xx responses fail
/// on the first attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Backoff multiplier applied after each failed attempt.
    pub multiplier: f64,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let mut delay = self.initial_delay;
        for _ in 1..retry {
            delay = delay.mul_f64(self.multiplier);
        }
        delay
    }
}

/// Single-flight request throttle with a monotonic request counter.
pub struct Throttle {
    limiter: RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
    min_interval: Duration,
    request_count: AtomicU64,
}

impl Throttle {
    /// Build a throttle that spaces requests `60s / requests_per_minute` apart.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let min_interval = Duration::from_millis(60_000 / u64::from(requests_per_minute.max(1)));
        // Burst of 1: one cell replenished per interval, so callers are
        // suspended until the interval since the last request has elapsed.
        let quota = Quota::with_period(min_interval).expect("throttle interval is nonzero");
        Self {
            limiter: RateLimiter::direct(quota),
            min_interval,
            request_count: AtomicU64::new(0),
        }
    }

    /// Suspend until the next request slot is available, then count it.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
        self.request_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Total requests issued through this throttle.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Enforced minimum interval between requests.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// Run `op` with retries per `policy`.
///
/// Transient failures (see [`ApiError::is_transient`]) sleep and retry with
/// multiplicative backoff; anything else propagates immediately.
pub async fn with_retries<T, Fut>(
    policy: &RetryPolicy,
    mut op: impl FnMut() -> Fut,
) -> Result<T, ApiError>
where
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.attempts => {
                warn!(
                    "Transient provider error (attempt {}/{}), retrying in {:?}: {}",
                    attempt, policy.attempts, delay, err
                );
                tokio::time::sleep(delay).await;
                delay = delay.mul_f64(policy.multiplier);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn min_interval_from_rate() {
        assert_eq!(
            Throttle::per_minute(500).min_interval(),
            Duration::from_millis(120)
        );
        assert_eq!(
            Throttle::per_minute(100).min_interval(),
            Duration::from_millis(600)
        );
    }

    #[tokio::test]
    async fn acquire_counts_requests() {
        let throttle = Throttle::per_minute(60_000);
        assert_eq!(throttle.request_count(), 0);
        throttle.acquire().await;
        throttle.acquire().await;
        assert_eq!(throttle.request_count(), 2);
    }

    #[test]
    fn backoff_schedule() {
        let stats = RetryPolicy {
            attempts: 3,
            multiplier: 2.0,
            initial_delay: Duration::from_millis(1000),
        };
        assert_eq!(stats.delay_for(1), Duration::from_millis(1000));
        assert_eq!(stats.delay_for(2), Duration::from_millis(2000));

        let odds = RetryPolicy {
            attempts: 3,
            multiplier: 1.5,
            initial_delay: Duration::from_millis(500),
        };
        assert_eq!(odds.delay_for(1), Duration::from_millis(500));
        assert_eq!(odds.delay_for(2), Duration::from_millis(750));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_until_attempts_exhausted() {
        let policy = RetryPolicy {
            attempts: 3,
            multiplier: 2.0,
            initial_delay: Duration::from_millis(10),
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), ApiError> = with_retries(&policy, || {
            calls.fetch_add(1, Ordering::Relaxed);
            async { Err(ApiError::Network("down".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn does_not_retry_client_errors() {
        let policy = RetryPolicy {
            attempts: 3,
            multiplier: 2.0,
            initial_delay: Duration::from_millis(10),
        };
        let calls = AtomicU32::new(0);
        let result: Result<(), ApiError> = with_retries(&policy, || {
            calls.fetch_add(1, Ordering::Relaxed);
            async {
                Err(ApiError::Provider {
                    status: 401,
                    message: "bad key".to_string(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let policy = RetryPolicy {
            attempts: 3,
            multiplier: 1.5,
            initial_delay: Duration::from_millis(10),
        };
        let calls = AtomicU32::new(0);
        let result = with_retries(&policy, || {
            let n = calls.fetch_add(1, Ordering::Relaxed);
            async move {
                if n < 2 {
                    Err(ApiError::Network("flaky".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
