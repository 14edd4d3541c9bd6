use enrich::{EnrichmentClient, EntityDocument};
use flatten::explode;
use table::{EntityAnnotation, SentimentSentence, TableSource};

use crate::validate::entity_score_warnings;
use crate::{EtlError, Pipeline, Stage, StageOutput};

impl<C: EnrichmentClient> Pipeline<C> {
    pub(crate) async fn extract_entities(
        &self,
        input: TableSource<'_, SentimentSentence>,
    ) -> Result<StageOutput<EntityAnnotation>, EtlError> {
        let stage = Stage::Entities;
        let sentences = input
            .resolve()
            .await
            .map_err(|source| EtlError::Input { stage, source })?;

        let enriched = self
            .enrich(
                stage,
                &*sentences,
                |sentence: &SentimentSentence| {
                    format!("{}: {}", sentence.place_id, sentence.sentence_text)
                },
                |sentence| self.client.entities(&sentence.sentence_text),
                |_: &EntityDocument| Ok(()),
            )
            .await?;

        // Every sentence column passes through onto each entity row.
        let exploded = explode(
            &enriched.parents,
            |(_, document)| document.entities.as_deref(),
            |(sentence, _), entity| EntityAnnotation {
                place_id: sentence.place_id.clone(),
                place_name: sentence.place_name.clone(),
                author_name: sentence.author_name.clone(),
                rating: sentence.rating,
                sentence_text: sentence.sentence_text.clone(),
                sentence_sentiment: sentence.sentence_sentiment,
                confidence_positive: sentence.confidence_positive,
                confidence_neutral: sentence.confidence_neutral,
                confidence_negative: sentence.confidence_negative,
                entity_text: entity.text.clone(),
                entity_category: entity.category.clone(),
                entity_subcategory: entity.subcategory.clone(),
                confidence_entity: entity.confidence_score,
            },
        );
        let warnings = entity_score_warnings(&exploded.rows);

        self.persist(
            stage,
            &self.config.artifacts.entities,
            sentences.len(),
            exploded,
            enriched.failures,
            warnings,
        )
        .await
    }
}
