pub mod cache;
pub mod client;
pub mod error;
pub mod schema;

pub use cache::{CacheStats, CachedClient};
pub use client::{DEFAULT_BASE_URL, EnrichmentClient, PortalClient};
pub use error::ClientError;
pub use reqwest::StatusCode;
pub use schema::{
    ConfidenceScores, EntityDocument, PlaceDetails, PlaceReview, RecognizedEntity,
    SentenceSentiment, SentimentDocument,
};
