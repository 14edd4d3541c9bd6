use enrich::{EnrichmentClient, PlaceDetails};
use flatten::explode;
use table::{PlaceId, Review, TableSource};

use crate::{EtlError, Pipeline, Stage, StageOutput};

fn check_ratings(details: &PlaceDetails) -> Result<(), String> {
    let reviews = details.reviews.as_deref().unwrap_or_default();
    match reviews.iter().position(|r| !(1..=5).contains(&r.rating)) {
        Some(i) => Err(format!(
            "review {i} has rating {}, expected 1..=5",
            reviews[i].rating
        )),
        None => Ok(()),
    }
}

impl<C: EnrichmentClient> Pipeline<C> {
    pub(crate) async fn extract_reviews(
        &self,
        input: TableSource<'_, PlaceId>,
    ) -> Result<StageOutput<Review>, EtlError> {
        let stage = Stage::Reviews;
        let places = input
            .resolve()
            .await
            .map_err(|source| EtlError::Input { stage, source })?;

        let enriched = self
            .enrich(
                stage,
                &*places,
                |place: &PlaceId| place.place_id.clone(),
                |place| self.client.place_details(&place.place_id),
                check_ratings,
            )
            .await?;

        // The requested id is broadcast, not the one echoed by the service.
        let exploded = explode(
            &enriched.parents,
            |(_, details)| details.reviews.as_deref(),
            |(place, details), review| Review {
                place_id: place.place_id.clone(),
                place_name: details.name.clone(),
                author_name: review.author_name.clone(),
                rating: review.rating,
                text: review.text.clone(),
            },
        );

        self.persist(
            stage,
            &self.config.artifacts.reviews,
            places.len(),
            exploded,
            enriched.failures,
            0,
        )
        .await
    }
}
