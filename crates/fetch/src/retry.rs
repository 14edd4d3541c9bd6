use std::time::Duration;

/// Decides whether a failed call is attempted again, and after how long.
///
/// `attempt` is the number of attempts already made (1 after the first failure).
pub trait RetryStrategy<E>: Send + Sync {
    fn next_delay(&self, attempt: usize, error: &E) -> Option<Duration>;
}

/// Never retry. The coordinator's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl<E> RetryStrategy<E> for NoRetry {
    fn next_delay(&self, _attempt: usize, _error: &E) -> Option<Duration> {
        None
    }
}

/// Exponential backoff, doubling from `initial_backoff` up to `max_backoff`.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    max_retries: usize,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl ExponentialBackoff {
    pub fn new(max_retries: usize, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_retries,
            initial_backoff: Duration::from_millis(initial_backoff_ms),
            max_backoff: Duration::from_millis(max_backoff_ms),
        }
    }
}

impl<E> RetryStrategy<E> for ExponentialBackoff {
    fn next_delay(&self, attempt: usize, _error: &E) -> Option<Duration> {
        if attempt > self.max_retries {
            return None;
        }
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = 2u32.saturating_pow(exponent);
        Some(std::cmp::min(
            self.initial_backoff.saturating_mul(factor),
            self.max_backoff,
        ))
    }
}

/// Apply `inner` only to errors accepted by `predicate`.
pub struct RetryIf<S, F> {
    inner: S,
    predicate: F,
}

impl<S, F> RetryIf<S, F> {
    pub fn new(inner: S, predicate: F) -> Self {
        Self { inner, predicate }
    }
}

impl<E, S, F> RetryStrategy<E> for RetryIf<S, F>
where
    S: RetryStrategy<E>,
    F: Fn(&E) -> bool + Send + Sync,
{
    fn next_delay(&self, attempt: usize, error: &E) -> Option<Duration> {
        if (self.predicate)(error) {
            self.inner.next_delay(attempt, error)
        } else {
            None
        }
    }
}
