use enrich::{EnrichmentClient, SentimentDocument};
use flatten::explode;
use table::{Review, SentimentSentence, TableSource};

use crate::validate::sentence_score_warnings;
use crate::{EtlError, Pipeline, Stage, StageOutput};

impl<C: EnrichmentClient> Pipeline<C> {
    pub(crate) async fn score_sentences(
        &self,
        input: TableSource<'_, Review>,
    ) -> Result<StageOutput<SentimentSentence>, EtlError> {
        let stage = Stage::Sentiment;
        let reviews = input
            .resolve()
            .await
            .map_err(|source| EtlError::Input { stage, source })?;

        let enriched = self
            .enrich(
                stage,
                &*reviews,
                |review: &Review| format!("{} by {}", review.place_id, review.author_name),
                |review| self.client.sentiment(&review.text),
                |_: &SentimentDocument| Ok(()),
            )
            .await?;

        let exploded = explode(
            &enriched.parents,
            |(_, document)| document.sentences.as_deref(),
            |(review, _), sentence| SentimentSentence {
                place_id: review.place_id.clone(),
                place_name: review.place_name.clone(),
                author_name: review.author_name.clone(),
                rating: review.rating,
                sentence_text: sentence.text.clone(),
                sentence_sentiment: sentence.sentiment,
                confidence_positive: sentence.confidence_scores.positive,
                confidence_neutral: sentence.confidence_scores.neutral,
                confidence_negative: sentence.confidence_scores.negative,
            },
        );
        let warnings = sentence_score_warnings(&exploded.rows);

        self.persist(
            stage,
            &self.config.artifacts.sentiment,
            reviews.len(),
            exploded,
            enriched.failures,
            warnings,
        )
        .await
    }
}
