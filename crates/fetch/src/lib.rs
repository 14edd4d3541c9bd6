//! Bounded, order-preserving fan-out of independent remote calls.

pub mod retry;

pub use retry::{ExponentialBackoff, NoRetry, RetryIf, RetryStrategy};

use std::future::Future;
use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 8;

/// A call that failed for good, identifying the input it was made for.
#[derive(Debug, Error)]
#[error("call #{index} for `{input}` failed after {attempts} attempt(s): {source}")]
pub struct RemoteCallError<E> {
    /// Position of the input in the batch.
    pub index: usize,
    /// Caller-supplied label of the input (place id, sentence, ...).
    pub input: String,
    pub attempts: usize,
    #[source]
    pub source: E,
}

/// Issues one call per input with at most `workers` calls in flight.
///
/// Results come back in input order regardless of completion order. A
/// coordinator is meant to live for the duration of one batch.
pub struct FetchCoordinator<E> {
    workers: usize,
    retry: Arc<dyn RetryStrategy<E>>,
}

impl<E: 'static> FetchCoordinator<E> {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            retry: Arc::new(NoRetry),
        }
    }

    pub fn with_retry(mut self, retry: Arc<dyn RetryStrategy<E>>) -> Self {
        self.retry = retry;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

impl<E: std::fmt::Display + 'static> FetchCoordinator<E> {
    /// Fail-fast: the first failing input (in input order) aborts the batch.
    pub async fn fetch_all<'a, I, T, L, F, Fut>(
        &self,
        inputs: &'a [I],
        label: L,
        call: F,
    ) -> Result<Vec<T>, RemoteCallError<E>>
    where
        L: Fn(&I) -> String,
        F: Fn(&'a I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        info!(calls = inputs.len(), workers = self.workers, "Dispatching batch");
        let (label, call) = (&label, &call);

        stream::iter(inputs.iter().enumerate())
            .map(|(index, input)| self.attempt(index, input, label, call))
            .buffered(self.workers)
            .try_collect()
            .await
    }

    /// Partial mode: every input gets its own outcome, in input order.
    pub async fn fetch_each<'a, I, T, L, F, Fut>(
        &self,
        inputs: &'a [I],
        label: L,
        call: F,
    ) -> Vec<Result<T, RemoteCallError<E>>>
    where
        L: Fn(&I) -> String,
        F: Fn(&'a I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        info!(calls = inputs.len(), workers = self.workers, "Dispatching batch");
        let (label, call) = (&label, &call);

        let outcomes: Vec<_> = stream::iter(inputs.iter().enumerate())
            .map(|(index, input)| self.attempt(index, input, label, call))
            .buffered(self.workers)
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        if failed > 0 {
            warn!(failed, total = outcomes.len(), "Batch finished with failures");
        }
        outcomes
    }

    async fn attempt<'a, I, T, L, F, Fut>(
        &self,
        index: usize,
        input: &'a I,
        label: &L,
        call: &F,
    ) -> Result<T, RemoteCallError<E>>
    where
        L: Fn(&I) -> String,
        F: Fn(&'a I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match call(input).await {
                Ok(result) => {
                    if attempts > 1 {
                        debug!(index, attempts, "Call succeeded after retries");
                    }
                    return Ok(result);
                }
                Err(error) => match self.retry.next_delay(attempts, &error) {
                    Some(backoff) => {
                        warn!(
                            index,
                            input = %label(input),
                            attempt = attempts,
                            backoff_ms = backoff.as_millis() as u64,
                            error = %error,
                            "Call failed, retrying"
                        );
                        sleep(backoff).await;
                    }
                    None => {
                        return Err(RemoteCallError {
                            index,
                            input: label(input),
                            attempts,
                            source: error,
                        });
                    }
                },
            }
        }
    }
}
