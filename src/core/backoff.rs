use std::future::Future;
use std::time::Duration;

/// Exponential backoff policy for retryable operations.
///
/// Attempt numbering is 1-based: the delay before retrying after attempt
/// `n` is `min(base * 2^(n-1), cap)`. No delay follows the final attempt.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub max_attempts: u32,
    pub base: Duration,
    pub cap: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base: Duration::from_millis(1000),
            cap: Duration::from_millis(30000),
        }
    }
}

impl BackoffPolicy {
    pub fn delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(31);
        let scaled = self
            .base
            .saturating_mul(1u32.checked_shl(exp).unwrap_or(u32::MAX));
        scaled.min(self.cap)
    }

    /// Runs `op` up to `max_attempts` times, sleeping between attempts.
    ///
    /// Errors for which `is_retryable` returns false are returned
    /// immediately; so is the error from the final attempt.
    pub async fn retry<T, E, F, Fut, P>(&self, mut op: F, is_retryable: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if is_retryable(&err) && attempt < self.max_attempts => {
                    let wait = self.delay(attempt);
                    tracing::warn!(
                        "attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        err,
                        wait
                    );
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn delay_doubles_up_to_the_cap() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay(1), Duration::from_millis(1000));
        assert_eq!(policy.delay(2), Duration::from_millis(2000));
        assert_eq!(policy.delay(3), Duration::from_millis(4000));
        assert_eq!(policy.delay(5), Duration::from_millis(16000));
        assert_eq!(policy.delay(6), Duration::from_millis(30000));
        assert_eq!(policy.delay(20), Duration::from_millis(30000));
    }

    #[tokio::test]
    async fn retry_stops_after_max_attempts() {
        let policy = BackoffPolicy {
            max_attempts: 3,
            base: Duration::from_millis(1),
            cap: Duration::from_millis(2),
        };
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("boom".to_string()) }
                },
                |_| true,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retry_does_not_repeat_non_retryable_errors() {
        let policy = BackoffPolicy::default();
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .retry(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("fatal".to_string()) }
                },
                |_| false,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_returns_first_success() {
        let policy = BackoffPolicy {
            max_attempts: 5,
            base: Duration::from_millis(1),
            cap: Duration::from_millis(1),
        };
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = policy
            .retry(
                || {
                    let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                    async move {
                        if n < 3 {
                            Err("transient".to_string())
                        } else {
                            Ok(n)
                        }
                    }
                },
                |_| true,
            )
            .await;

        assert_eq!(result.unwrap(), 3);
    }
}
