//! Retry policies with exponential backoff

use crate::error::ResilienceError;
use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Retry policy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first attempt)
    max_attempts: usize,
    /// Delay after the first failure
    initial_delay: Duration,
    /// Maximum delay between retries
    max_delay: Duration,
    /// Backoff multiplier
    multiplier: f64,
    /// Whether to use jitter
    use_jitter: bool,
}

impl RetryPolicy {
    /// Creates a new retry policy; at least one attempt is always made
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            use_jitter: true,
        }
    }

    /// Sets the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets whether to use jitter
    pub fn with_jitter(mut self, use_jitter: bool) -> Self {
        self.use_jitter = use_jitter;
        self
    }

    /// Calculates the delay that follows the `failures`-th failed attempt
    ///
    /// `delay_for_attempt(1)` is the initial delay, each further failure
    /// multiplies it, capped at the maximum delay. Zero failures means no delay.
    pub fn delay_for_attempt(&self, failures: usize) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(failures - 1).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped_delay = base_delay.min(self.max_delay.as_secs_f64());

        let final_delay = if self.use_jitter {
            // Scale into [75%, 100%] of the computed delay
            capped_delay * rand::rng().random_range(0.75..=1.0)
        } else {
            capped_delay
        };

        Duration::try_from_secs_f64(final_delay).unwrap_or(self.max_delay)
    }

    /// The full delay schedule, one entry per possible failure
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.max_attempts)
            .map(|failures| self.delay_for_attempt(failures))
            .collect()
    }

    /// Returns the maximum number of attempts
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Returns the initial delay
    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// A failed attempt that is about to be retried
#[derive(Debug)]
pub struct RetryAttempt<'a, E> {
    /// 1-based number of the attempt that just failed
    pub attempt: usize,
    /// How long the combinator will sleep before the next attempt
    pub delay: Duration,
    /// The failure
    pub error: &'a E,
}

/// Executes an async operation with retry logic
pub async fn with_retry<F, Fut, T, E>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    with_retry_notify(policy, operation, |_| {}).await
}

/// Executes an async operation with retry logic, reporting each retry
///
/// The operation runs at most `policy.max_attempts()` times. After every
/// failure except the last, `on_retry` is called and the combinator sleeps
/// for the policy's delay. The final failure is returned without sleeping.
pub async fn with_retry_notify<F, Fut, T, E, N>(
    policy: &RetryPolicy,
    mut operation: F,
    mut on_retry: N,
) -> Result<T, ResilienceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    N: FnMut(RetryAttempt<'_, E>),
{
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    log::debug!("Operation succeeded on attempt {}", attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if attempt >= policy.max_attempts() {
                    log::warn!("Giving up after {} attempts: {}", attempt, e);
                    return Err(ResilienceError::RetriesExhausted {
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }

                let delay = policy.delay_for_attempt(attempt);
                log::debug!("Attempt {} failed ({}), retrying in {:?}", attempt, e, delay);
                on_retry(RetryAttempt {
                    attempt,
                    delay,
                    error: &e,
                });
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fixed(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts)
            .with_initial_delay(Duration::from_secs(1))
            .with_jitter(false)
    }

    #[test]
    fn test_retry_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        assert_eq!(RetryPolicy::new(0).max_attempts(), 1);
    }

    #[test]
    fn test_retry_policy_builder() {
        let policy = RetryPolicy::new(5)
            .with_initial_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(60))
            .with_multiplier(3.0)
            .with_jitter(false);

        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert_eq!(policy.max_delay, Duration::from_secs(60));
        assert_eq!(policy.multiplier, 3.0);
        assert!(!policy.use_jitter);
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = fixed(5);

        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(
            policy.schedule(),
            vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
                Duration::from_secs(8),
                Duration::from_secs(16),
            ]
        );
    }

    #[test]
    fn test_max_delay_capping() {
        let policy = fixed(10).with_max_delay(Duration::from_secs(5));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::new(3).with_initial_delay(Duration::from_secs(4));
        for _ in 0..50 {
            let delay = policy.delay_for_attempt(1);
            assert!(delay >= Duration::from_secs(3));
            assert!(delay <= Duration::from_secs(4));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_success_first_attempt() {
        let calls = Cell::new(0);

        let result = with_retry(&fixed(3), || {
            calls.set(calls.get() + 1);
            async { Ok::<_, String>(42) }
        })
        .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_success_after_failures() {
        let calls = Cell::new(0);

        let result = with_retry(&fixed(3), || {
            calls.set(calls.get() + 1);
            let n = calls.get();
            async move {
                if n < 3 {
                    Err("temporary error")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.ok(), Some(42));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_all_attempts_fail() {
        let calls = Cell::new(0);

        let result = with_retry(&fixed(3), || {
            calls.set(calls.get() + 1);
            async { Err::<i32, _>("persistent error") }
        })
        .await;

        assert_eq!(calls.get(), 3);
        match result {
            Err(ResilienceError::RetriesExhausted {
                attempts,
                last_error,
            }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last_error, "persistent error");
            }
            other => panic!("Expected RetriesExhausted error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_sees_each_retry_and_sleeps() {
        let mut seen = Vec::new();
        let start = tokio::time::Instant::now();

        let result = with_retry_notify(
            &fixed(5),
            || async { Err::<(), _>("down") },
            |retry| seen.push((retry.attempt, retry.delay, retry.error.to_string())),
        )
        .await;

        assert!(result.is_err());
        let attempts: Vec<usize> = seen.iter().map(|(a, _, _)| *a).collect();
        let delays: Vec<u64> = seen.iter().map(|(_, d, _)| d.as_secs()).collect();
        assert_eq!(attempts, vec![1, 2, 3, 4]);
        assert_eq!(delays, vec![1, 2, 4, 8]);
        assert!(seen.iter().all(|(_, _, e)| e == "down"));
        // The last failure returns immediately
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }
}
