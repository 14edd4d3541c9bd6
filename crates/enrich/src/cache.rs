use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::client::EnrichmentClient;
use crate::error::ClientError;

/// Memoizes successful responses of an inner client, keyed by operation and input.
///
/// Reviews often repeat sentences ("Great food."), so the sentiment and entity
/// stages hit the cache for duplicates within and across runs of one process.
pub struct CachedClient<C> {
    inner: C,
    responses: Arc<DashMap<String, Value>>,
    max_entries: usize,
}

impl<C> CachedClient<C> {
    pub fn new(inner: C, max_entries: usize) -> Self {
        Self {
            inner,
            responses: Arc::new(DashMap::new()),
            max_entries,
        }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            responses_cached: self.responses.len(),
        }
    }

    fn key(operation: &str, input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(operation.as_bytes());
        hasher.update([0u8]);
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn insert(&self, key: String, response: Value) {
        if self.max_entries == 0 {
            return;
        }
        if self.responses.len() >= self.max_entries {
            // Simple eviction: clear 25% when full
            let to_remove: Vec<_> = self
                .responses
                .iter()
                .take((self.max_entries / 4).max(1))
                .map(|r| r.key().clone())
                .collect();
            for key in to_remove {
                self.responses.remove(&key);
            }
        }
        self.responses.insert(key, response);
    }

    async fn memoized<F>(&self, operation: &str, input: &str, fetch: F) -> Result<Value, ClientError>
    where
        F: Future<Output = Result<Value, ClientError>>,
    {
        let key = Self::key(operation, input);
        if let Some(hit) = self.responses.get(&key) {
            debug!(operation, "Response cache hit");
            return Ok(hit.value().clone());
        }

        let response = fetch.await?;
        self.insert(key, response.clone());
        Ok(response)
    }
}

#[async_trait]
impl<C: EnrichmentClient> EnrichmentClient for CachedClient<C> {
    async fn place_details(&self, place_id: &str) -> Result<Value, ClientError> {
        self.memoized("place_details", place_id, self.inner.place_details(place_id))
            .await
    }

    async fn sentiment(&self, text: &str) -> Result<Value, ClientError> {
        self.memoized("sentiment", text, self.inner.sentiment(text))
            .await
    }

    async fn entities(&self, text: &str) -> Result<Value, ClientError> {
        self.memoized("entities", text, self.inner.entities(text))
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub responses_cached: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EnrichmentClient for CountingClient {
        async fn place_details(&self, place_id: &str) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "name": place_id, "reviews": [] }))
        }

        async fn sentiment(&self, text: &str) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.is_empty() {
                return Err(ClientError::Status {
                    url: "stub".into(),
                    status: reqwest::StatusCode::BAD_REQUEST,
                    body: "empty text".into(),
                });
            }
            Ok(json!({ "sentences": [{ "text": text }] }))
        }

        async fn entities(&self, text: &str) -> Result<Value, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(json!({ "entities": [{ "text": text }] }))
        }
    }

    #[tokio::test]
    async fn test_repeated_input_is_served_from_cache() {
        let client = CachedClient::new(CountingClient::default(), 16);

        let first = client.sentiment("Great food").await.unwrap();
        let second = client.sentiment("Great food").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_operations_do_not_share_entries() {
        let client = CachedClient::new(CountingClient::default(), 16);

        client.sentiment("food").await.unwrap();
        client.entities("food").await.unwrap();

        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.stats().responses_cached, 2);
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let client = CachedClient::new(CountingClient::default(), 16);

        assert!(client.sentiment("").await.is_err());
        assert!(client.sentiment("").await.is_err());

        assert_eq!(client.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(client.stats().responses_cached, 0);
    }

    #[tokio::test]
    async fn test_eviction_keeps_size_bounded() {
        let client = CachedClient::new(CountingClient::default(), 4);

        for i in 0..10 {
            client.entities(&format!("entity {i}")).await.unwrap();
        }

        assert!(client.stats().responses_cached <= 4);
    }
}
