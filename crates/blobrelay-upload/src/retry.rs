//! Retry with exponential backoff for object-store writes.
//!
//! Store write results must be observable as failed: every attempt's error is
//! inspected here, retried up to the configured bound, and the exhausted case
//! is handed back to the worker to log and count.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use blobrelay_store::{StoreError, StoreResult};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts beyond the first try.
    pub max_retries: u32,
    /// Initial backoff duration.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add random jitter to each backoff.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

/// Outcome of a retried operation.
#[derive(Debug)]
pub enum RetryOutcome<T> {
    /// Operation succeeded.
    Success(T),
    /// All attempts failed.
    Exhausted {
        /// The last error observed.
        last_error: StoreError,
        /// Total number of attempts made.
        attempts: u32,
    },
}

/// Executor applying the configured backoff to an async operation.
#[derive(Debug, Clone)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor with the given configuration.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation`, retrying every failure with exponential backoff until
    /// it succeeds or `max_retries` extra attempts are spent.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> RetryOutcome<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut backoff = self.config.initial_backoff;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => return RetryOutcome::Success(value),
                Err(error) => {
                    if attempt > self.config.max_retries {
                        return RetryOutcome::Exhausted {
                            last_error: error,
                            attempts: attempt,
                        };
                    }
                    warn!(attempt, error = %error, "store write failed, backing off");
                    tokio::time::sleep(self.delay(backoff)).await;
                    backoff = backoff
                        .mul_f64(self.config.backoff_multiplier)
                        .min(self.config.max_backoff);
                }
            }
        }
    }

    fn delay(&self, backoff: Duration) -> Duration {
        let capped = backoff.min(self.config.max_backoff);
        if self.config.jitter {
            // 50%..150% of the nominal delay.
            capped.mul_f64(0.5 + rand::random::<f64>())
        } else {
            capped
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    #[tokio::test]
    async fn succeeds_first_try() {
        let executor = RetryExecutor::new(fast_config(3));
        let outcome = executor.execute(|| async { Ok::<_, StoreError>(7) }).await;
        assert!(matches!(outcome, RetryOutcome::Success(7)));
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let executor = RetryExecutor::new(fast_config(3));
        let calls = AtomicU32::new(0);
        let outcome = executor
            .execute(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(StoreError::Backend("transient".to_string()))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert!(matches!(outcome, RetryOutcome::Success(())));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhausts_after_bounded_attempts() {
        let executor = RetryExecutor::new(fast_config(2));
        let calls = AtomicU32::new(0);
        let outcome = executor
            .execute(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(StoreError::Backend("down".to_string())) }
            })
            .await;
        match outcome {
            RetryOutcome::Exhausted { attempts, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(calls.load(Ordering::SeqCst), 3);
            }
            RetryOutcome::Success(_) => panic!("expected exhaustion"),
        }
    }
}
