use table::{Artifact, EntityAnnotation, Review, SentimentSentence};
use uuid::Uuid;

use crate::state::Stage;

/// An input skipped in partial mode.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    pub index: usize,
    pub input: String,
    pub cause: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    pub stage: Stage,
    pub input_rows: usize,
    pub output_rows: usize,
    /// Parents that yielded no child rows and are absent from the output.
    pub childless: usize,
    pub failures: Vec<ItemFailure>,
    /// Rows whose confidence scores failed validation (logged, not rejected).
    pub score_warnings: usize,
    pub artifact: Artifact,
}

#[derive(Debug, Clone)]
pub struct StageOutput<T> {
    pub rows: Vec<T>,
    pub report: StageReport,
}

#[derive(Debug, Clone)]
pub struct RunOutput {
    pub run_id: Uuid,
    pub reviews: StageOutput<Review>,
    pub sentiment: StageOutput<SentimentSentence>,
    pub entities: StageOutput<EntityAnnotation>,
}

impl RunOutput {
    pub fn reports(&self) -> [&StageReport; 3] {
        [
            &self.reviews.report,
            &self.sentiment.report,
            &self.entities.report,
        ]
    }
}
