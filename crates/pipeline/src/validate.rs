use table::{EntityAnnotation, SentimentSentence};
use tracing::warn;

/// Sentiment scores are reported with two decimals, so the sum may be off by a rounding step.
pub const SCORE_TOLERANCE: f64 = 0.011;

pub fn in_unit_range(score: f64) -> bool {
    (0.0..=1.0).contains(&score)
}

pub fn sums_to_one(scores: &[f64]) -> bool {
    (scores.iter().sum::<f64>() - 1.0).abs() <= SCORE_TOLERANCE
}

pub(crate) fn sentence_score_warnings(rows: &[SentimentSentence]) -> usize {
    let mut warnings = 0;
    for (index, row) in rows.iter().enumerate() {
        let scores = [
            row.confidence_positive,
            row.confidence_neutral,
            row.confidence_negative,
        ];
        if !(scores.iter().copied().all(in_unit_range) && sums_to_one(&scores)) {
            warn!(
                index,
                place_id = %row.place_id,
                positive = row.confidence_positive,
                neutral = row.confidence_neutral,
                negative = row.confidence_negative,
                "Sentence confidence scores do not sum to 1"
            );
            warnings += 1;
        }
    }
    warnings
}

pub(crate) fn entity_score_warnings(rows: &[EntityAnnotation]) -> usize {
    let mut warnings = 0;
    for (index, row) in rows.iter().enumerate() {
        if !in_unit_range(row.confidence_entity) {
            warn!(
                index,
                entity = %row.entity_text,
                confidence = row.confidence_entity,
                "Entity confidence outside [0, 1]"
            );
            warnings += 1;
        }
    }
    warnings
}
