//! Fixed-delay retry policy for dataset fetches.

use std::{fmt::Display, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::warn;

use crate::config::AppConfig;

/// Retry with a constant pause after every failed attempt.
///
/// The pause also follows the final failure, so a dataset that never loads
/// is reported failed `max_attempts * delay` after the first attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts before giving up; at least one.
    pub max_attempts: usize,
    /// Pause after each failure.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Build a policy; `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Policy configured by the user.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.retry_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    /// Run `op` until it succeeds or the attempts are exhausted.
    ///
    /// `op` receives the zero-based attempt number.
    pub async fn retry_async<F, Fut, T, E>(&self, mut op: F) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    warn!(attempt, max = self.max_attempts, "attempt failed: {err}");
                    sleep(self.delay).await;
                    if attempt >= self.max_attempts {
                        return Err(err);
                    }
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn new_clamps_attempts() {
        let policy = RetryPolicy::new(0, Duration::from_millis(5));
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_take_full_backoff() {
        let policy = RetryPolicy::default();
        let attempts = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();

        let result: Result<(), &str> = policy
            .retry_async(|_| {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    Err("offline")
                }
            })
            .await;

        assert_eq!(result, Err("offline"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed < Duration::from_millis(3_100));
    }

    #[tokio::test(start_paused = true)]
    async fn success_stops_retrying() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10));
        let attempts = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();

        let result: Result<&str, &str> = policy
            .retry_async(|attempt| {
                let attempts = attempts.clone();
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("boom")
                    } else {
                        Ok("ok")
                    }
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(20));
        assert!(elapsed < Duration::from_millis(50));
    }
}
