//! Reviews -> sentiment -> entities.
//!
//! Each stage loads its input table, fans out one remote call per row, joins
//! every child item of the response with its parent row, writes the fixed-schema
//! cache artifact and returns the table.

pub mod error;
pub mod report;
mod stages;
pub mod state;
pub mod validate;

pub use error::{EtlError, SchemaError};
pub use report::{ItemFailure, RunOutput, StageOutput, StageReport};
pub use state::{RunState, Stage};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use enrich::{ClientError, EnrichmentClient};
use fetch::{DEFAULT_WORKERS, NoRetry, RetryStrategy};
use serde::{Deserialize, Serialize};
use table::{EntityAnnotation, PlaceId, Review, SentimentSentence, TableSource};
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

pub const PLACE_IDS_FILE: &str = "place_ids.csv";
pub const REVIEWS_FILE: &str = "reviews.csv";
pub const SENTIMENT_FILE: &str = "reviews_sentiment_by_sentence.csv";
pub const ENTITIES_FILE: &str = "reviews_sentiment_by_sentence_with_entities.csv";

/// What a stage does when individual inputs fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failing input aborts the stage; nothing is written.
    #[default]
    FailFast,
    /// Failing inputs are skipped and listed in the stage report.
    Partial,
}

/// Where each stage persists its artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub reviews: PathBuf,
    pub sentiment: PathBuf,
    pub entities: PathBuf,
}

impl ArtifactPaths {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            reviews: dir.join(REVIEWS_FILE),
            sentiment: dir.join(SENTIMENT_FILE),
            entities: dir.join(ENTITIES_FILE),
        }
    }
}

#[derive(Clone)]
pub struct PipelineConfig {
    /// Upper bound on concurrent remote calls within a stage.
    pub workers: usize,
    pub retry: Arc<dyn RetryStrategy<ClientError>>,
    pub failure_policy: FailurePolicy,
    pub artifacts: ArtifactPaths,
}

impl PipelineConfig {
    pub fn new(artifacts: ArtifactPaths) -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            retry: Arc::new(NoRetry),
            failure_policy: FailurePolicy::FailFast,
            artifacts,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_retry(mut self, retry: Arc<dyn RetryStrategy<ClientError>>) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

pub struct Pipeline<C> {
    client: C,
    config: PipelineConfig,
    state: RunState,
}

impl<C: EnrichmentClient> Pipeline<C> {
    pub fn new(client: C, config: PipelineConfig) -> Self {
        Self {
            client,
            config,
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Stage 1: place ids -> one row per review.
    pub async fn reviews_step<'a>(
        &mut self,
        place_ids: impl Into<TableSource<'a, PlaceId>>,
    ) -> Result<StageOutput<Review>, EtlError> {
        self.state = RunState::Running(Stage::Reviews);
        let outcome = self.extract_reviews(place_ids.into()).await;
        self.settle(Stage::Reviews, &outcome);
        outcome
    }

    /// Stage 2: reviews -> one row per sentence with its sentiment.
    pub async fn sentiment_step<'a>(
        &mut self,
        reviews: impl Into<TableSource<'a, Review>>,
    ) -> Result<StageOutput<SentimentSentence>, EtlError> {
        self.state = RunState::Running(Stage::Sentiment);
        let outcome = self.score_sentences(reviews.into()).await;
        self.settle(Stage::Sentiment, &outcome);
        outcome
    }

    /// Stage 3: sentences -> one row per recognized entity.
    pub async fn entity_extraction_step<'a>(
        &mut self,
        sentences: impl Into<TableSource<'a, SentimentSentence>>,
    ) -> Result<StageOutput<EntityAnnotation>, EtlError> {
        self.state = RunState::Running(Stage::Entities);
        let outcome = self.extract_entities(sentences.into()).await;
        self.settle(Stage::Entities, &outcome);
        outcome
    }

    /// All three stages in sequence. A failing stage stops the run; later
    /// stages are not invoked.
    pub async fn run<'a>(
        &mut self,
        place_ids: impl Into<TableSource<'a, PlaceId>>,
    ) -> Result<RunOutput, EtlError> {
        let run_id = Uuid::new_v4();
        let place_ids = place_ids.into();

        async {
            info!("Pipeline run started");
            let reviews = self.reviews_step(place_ids).await?;
            let sentiment = self.sentiment_step(&reviews.rows).await?;
            let entities = self.entity_extraction_step(&sentiment.rows).await?;
            info!(rows = entities.rows.len(), "Pipeline run finished");

            Ok::<_, EtlError>(RunOutput {
                run_id,
                reviews,
                sentiment,
                entities,
            })
        }
        .instrument(info_span!("run", %run_id))
        .await
    }

    fn settle<T>(&mut self, stage: Stage, outcome: &Result<StageOutput<T>, EtlError>) {
        self.state = match outcome {
            Ok(output) => {
                info!(
                    %stage,
                    input_rows = output.report.input_rows,
                    output_rows = output.report.output_rows,
                    childless = output.report.childless,
                    failed = output.report.failures.len(),
                    "Stage completed"
                );
                RunState::Completed(stage)
            }
            Err(e) => {
                error!(%stage, error = %e, "Stage failed");
                RunState::Failed(stage)
            }
        };
    }
}
