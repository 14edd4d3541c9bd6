//! Response documents returned by the enrichment services.
//!
//! Unknown fields are ignored. The child lists (`reviews`, `sentences`,
//! `entities`) must be present in the document but may be `null`.

use serde::{Deserialize, Deserializer, Serialize};
use table::SentimentLabel;

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceDetails {
    pub name: String,
    #[serde(deserialize_with = "nullable")]
    pub reviews: Option<Vec<PlaceReview>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceReview {
    pub author_name: String,
    pub rating: u8,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceScores {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentDocument {
    // Document-level fields
    #[serde(default)]
    pub sentiment: Option<SentimentLabel>,
    #[serde(default)]
    pub confidence_scores: Option<ConfidenceScores>,

    #[serde(deserialize_with = "nullable")]
    pub sentences: Option<Vec<SentenceSentiment>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceSentiment {
    pub text: String,
    pub sentiment: SentimentLabel,
    pub confidence_scores: ConfidenceScores,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDocument {
    #[serde(deserialize_with = "nullable")]
    pub entities: Option<Vec<RecognizedEntity>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognizedEntity {
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    pub confidence_score: f64,
}
