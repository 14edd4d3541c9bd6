#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use enrich::{ClientError, EnrichmentClient, StatusCode};
use rand::Rng;
use serde_json::{Value, json};

/// Deterministic in-memory stand-in for the enrichment portal.
#[derive(Default)]
pub struct StubClient {
    places: HashMap<String, Value>,
    sentiments: HashMap<String, Value>,
    entities: HashMap<String, Value>,
    failing: HashSet<String>,
    max_latency_ms: u64,
    calls: AtomicUsize,
}

impl StubClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(mut self, place_id: &str, details: Value) -> Self {
        self.places.insert(place_id.to_string(), details);
        self
    }

    pub fn sentiment(mut self, text: &str, document: Value) -> Self {
        self.sentiments.insert(text.to_string(), document);
        self
    }

    pub fn entities(mut self, text: &str, document: Value) -> Self {
        self.entities.insert(text.to_string(), document);
        self
    }

    /// Any call whose argument equals `input` answers 503.
    pub fn failing(mut self, input: &str) -> Self {
        self.failing.insert(input.to_string());
        self
    }

    pub fn with_random_latency(mut self, max_ms: u64) -> Self {
        self.max_latency_ms = max_ms;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer(&self, table: &HashMap<String, Value>, input: &str) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.max_latency_ms > 0 {
            let delay = rand::thread_rng().gen_range(0..self.max_latency_ms);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.failing.contains(input) {
            return Err(ClientError::Status {
                url: format!("stub://{input}"),
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".to_string(),
            });
        }
        table.get(input).cloned().ok_or_else(|| ClientError::Status {
            url: format!("stub://{input}"),
            status: StatusCode::NOT_FOUND,
            body: "no stubbed response".to_string(),
        })
    }
}

#[async_trait]
impl EnrichmentClient for StubClient {
    async fn place_details(&self, place_id: &str) -> Result<Value, ClientError> {
        self.answer(&self.places, place_id).await
    }

    async fn sentiment(&self, text: &str) -> Result<Value, ClientError> {
        self.answer(&self.sentiments, text).await
    }

    async fn entities(&self, text: &str) -> Result<Value, ClientError> {
        self.answer(&self.entities, text).await
    }
}

pub fn sentence(text: &str, sentiment: &str, scores: [f64; 3]) -> Value {
    json!({
        "text": text,
        "sentiment": sentiment,
        "confidenceScores": {
            "positive": scores[0],
            "neutral": scores[1],
            "negative": scores[2],
        },
    })
}

pub fn sentiment_document(sentences: Vec<Value>) -> Value {
    json!({
        "sentiment": "positive",
        "confidenceScores": { "positive": 0.9, "neutral": 0.08, "negative": 0.02 },
        "sentences": sentences,
    })
}

/// The single-place fixture: P1 "Cafe X" with one review "Great food".
pub fn cafe_x() -> StubClient {
    StubClient::new()
        .place(
            "P1",
            json!({
                "name": "Cafe X",
                "reviews": [{ "author_name": "A", "rating": 5, "text": "Great food" }],
            }),
        )
        .sentiment(
            "Great food",
            sentiment_document(vec![sentence("Great food", "positive", [0.9, 0.08, 0.02])]),
        )
        .entities(
            "Great food",
            json!({
                "entities": [{ "text": "food", "category": "Product", "confidenceScore": 0.7 }],
            }),
        )
}
