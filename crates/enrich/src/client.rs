use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://cent.ischool-iot.net/api";

/// Remote enrichment operations. Each call returns the service's inner
/// response document; envelopes are unwrapped by the implementation.
#[async_trait]
pub trait EnrichmentClient: Send + Sync {
    /// `{ name, reviews: [{author_name, rating, text}, ...] }`
    async fn place_details(&self, place_id: &str) -> Result<Value, ClientError>;

    /// `{ sentiment, confidenceScores, sentences: [...] }`
    async fn sentiment(&self, text: &str) -> Result<Value, ClientError>;

    /// `{ entities: [{text, category, subcategory?, confidenceScore}, ...] }`
    async fn entities(&self, text: &str) -> Result<Value, ClientError>;
}

#[async_trait]
impl<T: EnrichmentClient + ?Sized> EnrichmentClient for Arc<T> {
    async fn place_details(&self, place_id: &str) -> Result<Value, ClientError> {
        (**self).place_details(place_id).await
    }

    async fn sentiment(&self, text: &str) -> Result<Value, ClientError> {
        (**self).sentiment(text).await
    }

    async fn entities(&self, text: &str) -> Result<Value, ClientError> {
        (**self).entities(text).await
    }
}

/// Client for the enrichment portal fronting the places and text-analytics services.
#[derive(Clone)]
pub struct PortalClient {
    base_url: String,
    client: reqwest::Client,
}

impl PortalClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut key = HeaderValue::from_str(api_key).map_err(|_| ClientError::InvalidApiKey)?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("X-API-KEY", key);

        // One client for all calls: connection pooling and shared headers
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        form: &[(&str, &str)],
    ) -> Result<Value, ClientError> {
        let url = format!("{}/{}", self.base_url, path);

        let mut request = self.client.request(method, &url).query(query);
        if !form.is_empty() {
            request = request.form(form);
        }

        let response = request.send().await.map_err(|source| ClientError::Transport {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { url, status, body });
        }

        debug!(url = %url, status = status.as_u16(), "Portal call succeeded");

        response
            .json::<Value>()
            .await
            .map_err(|source| ClientError::Decode { url, source })
    }

    /// Text-analytics responses wrap a single document in `results.documents`.
    fn first_document(operation: &'static str, mut body: Value) -> Result<Value, ClientError> {
        body.pointer_mut("/results/documents/0")
            .map(Value::take)
            .ok_or(ClientError::Envelope {
                operation,
                expected: "results.documents[0]",
            })
    }
}

#[async_trait]
impl EnrichmentClient for PortalClient {
    async fn place_details(&self, place_id: &str) -> Result<Value, ClientError> {
        let mut body = self
            .call(
                Method::GET,
                "google/places/details",
                &[("place_id", place_id)],
                &[],
            )
            .await?;

        body.get_mut("result")
            .map(Value::take)
            .ok_or(ClientError::Envelope {
                operation: "place details",
                expected: "result",
            })
    }

    async fn sentiment(&self, text: &str) -> Result<Value, ClientError> {
        let body = self
            .call(Method::POST, "azure/sentiment", &[], &[("text", text)])
            .await?;
        Self::first_document("sentiment", body)
    }

    async fn entities(&self, text: &str) -> Result<Value, ClientError> {
        let body = self
            .call(Method::POST, "azure/entityrecognition", &[], &[("text", text)])
            .await?;
        Self::first_document("entity recognition", body)
    }
}
