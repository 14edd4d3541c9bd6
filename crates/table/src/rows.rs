use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A table row with a fixed, versioned column contract.
///
/// `COLUMNS` is the exact header written to the cache artifact. The serde field
/// order of every implementor must match it; the tests below pin both.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// Artifact name used in logs and reports.
    const ARTIFACT: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Whether a table of this kind must contain at least one row.
    const REQUIRES_ROWS: bool = false;

    fn check_header(headers: &csv::StringRecord) -> Result<(), String> {
        if headers.iter().eq(Self::COLUMNS.iter().copied()) {
            Ok(())
        } else {
            Err(headers.iter().collect::<Vec<_>>().join(","))
        }
    }

    fn check_row(&self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceId {
    #[serde(alias = "Google Place ID")]
    pub place_id: String,
}

impl PlaceId {
    pub fn new(place_id: impl Into<String>) -> Self {
        Self {
            place_id: place_id.into(),
        }
    }
}

impl Record for PlaceId {
    const ARTIFACT: &'static str = "place_ids";
    const COLUMNS: &'static [&'static str] = &["place_id"];
    const REQUIRES_ROWS: bool = true;

    // Source files may still use the legacy header; extra columns are ignored.
    fn check_header(headers: &csv::StringRecord) -> Result<(), String> {
        if headers
            .iter()
            .any(|h| h == "place_id" || h == "Google Place ID")
        {
            Ok(())
        } else {
            Err(headers.iter().collect::<Vec<_>>().join(","))
        }
    }

    fn check_row(&self) -> Result<(), String> {
        if self.place_id.trim().is_empty() {
            return Err("place_id is blank".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub place_id: String,
    pub place_name: String,
    pub author_name: String,
    pub rating: u8,
    pub text: String,
}

impl Record for Review {
    const ARTIFACT: &'static str = "reviews";
    const COLUMNS: &'static [&'static str] =
        &["place_id", "place_name", "author_name", "rating", "text"];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSentence {
    pub place_id: String,
    pub place_name: String,
    pub author_name: String,
    pub rating: u8,
    pub sentence_text: String,
    pub sentence_sentiment: SentimentLabel,
    pub confidence_positive: f64,
    pub confidence_neutral: f64,
    pub confidence_negative: f64,
}

impl Record for SentimentSentence {
    const ARTIFACT: &'static str = "sentiment_by_sentence";
    const COLUMNS: &'static [&'static str] = &[
        "place_id",
        "place_name",
        "author_name",
        "rating",
        "sentence_text",
        "sentence_sentiment",
        "confidence_positive",
        "confidence_neutral",
        "confidence_negative",
    ];
}

/// One recognized entity within one sentence. Every sentence column passes
/// through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityAnnotation {
    pub place_id: String,
    pub place_name: String,
    pub author_name: String,
    pub rating: u8,
    pub sentence_text: String,
    pub sentence_sentiment: SentimentLabel,
    pub confidence_positive: f64,
    pub confidence_neutral: f64,
    pub confidence_negative: f64,
    pub entity_text: String,
    pub entity_category: String,
    pub entity_subcategory: Option<String>,
    pub confidence_entity: f64,
}

impl Record for EntityAnnotation {
    const ARTIFACT: &'static str = "sentiment_with_entities_by_sentence";
    const COLUMNS: &'static [&'static str] = &[
        "place_id",
        "place_name",
        "author_name",
        "rating",
        "sentence_text",
        "sentence_sentiment",
        "confidence_positive",
        "confidence_neutral",
        "confidence_negative",
        "entity_text",
        "entity_category",
        "entity_subcategory",
        "confidence_entity",
    ];
}
