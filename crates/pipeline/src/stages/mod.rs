//! Shared fetch -> parse -> persist plumbing for the three stages.

mod entities;
mod reviews;
mod sentiment;

use std::future::Future;
use std::path::Path;

use enrich::{ClientError, EnrichmentClient};
use fetch::{FetchCoordinator, RemoteCallError};
use flatten::Exploded;
use serde::de::DeserializeOwned;
use serde_json::Value;
use table::{Record, write_artifact};
use tracing::warn;

use crate::report::{ItemFailure, StageOutput, StageReport};
use crate::{EtlError, FailurePolicy, Pipeline, SchemaError, Stage};

/// Input rows paired with their parsed response documents, in input order.
pub(crate) struct Enriched<'a, I, D> {
    pub parents: Vec<(&'a I, D)>,
    pub failures: Vec<ItemFailure>,
}

impl<C: EnrichmentClient> Pipeline<C> {
    /// Call the remote service once per input row and parse each response.
    ///
    /// The coordinator is created here and dropped when the batch is done.
    pub(crate) async fn enrich<'a, I, D, L, F, Fut, K>(
        &self,
        stage: Stage,
        inputs: &'a [I],
        label: L,
        call: F,
        check: K,
    ) -> Result<Enriched<'a, I, D>, EtlError>
    where
        L: Fn(&I) -> String,
        F: Fn(&'a I) -> Fut,
        Fut: Future<Output = Result<Value, ClientError>>,
        D: DeserializeOwned,
        K: Fn(&D) -> Result<(), String>,
    {
        let policy = self.config.failure_policy;
        let coordinator =
            FetchCoordinator::new(self.config.workers).with_retry(self.config.retry.clone());

        let outcomes: Vec<Result<Value, RemoteCallError<ClientError>>> = match policy {
            FailurePolicy::FailFast => coordinator
                .fetch_all(inputs, &label, call)
                .await
                .map_err(|source| EtlError::RemoteCall { stage, source })?
                .into_iter()
                .map(Ok)
                .collect(),
            FailurePolicy::Partial => coordinator.fetch_each(inputs, &label, call).await,
        };

        let mut parents = Vec::with_capacity(inputs.len());
        let mut failures = Vec::new();

        for (index, (input, outcome)) in inputs.iter().zip(outcomes).enumerate() {
            let parsed = outcome
                .map_err(|source| EtlError::RemoteCall { stage, source })
                .and_then(|document| {
                    parse_document(document, &check).map_err(|message| EtlError::Schema {
                        stage,
                        input: label(input),
                        source: SchemaError {
                            record: index,
                            message,
                        },
                    })
                });

            match parsed {
                Ok(document) => parents.push((input, document)),
                Err(e) if policy == FailurePolicy::Partial => {
                    warn!(%stage, index, error = %e, "Skipping failed input");
                    failures.push(ItemFailure {
                        index,
                        input: label(input),
                        cause: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        Ok(Enriched { parents, failures })
    }

    /// Write the artifact and build the stage report. Runs only after every
    /// row of the stage has been produced.
    pub(crate) async fn persist<T: Record>(
        &self,
        stage: Stage,
        path: &Path,
        input_rows: usize,
        exploded: Exploded<T>,
        failures: Vec<ItemFailure>,
        score_warnings: usize,
    ) -> Result<StageOutput<T>, EtlError> {
        let artifact = write_artifact(path, &exploded.rows)
            .await
            .map_err(|source| EtlError::Artifact { stage, source })?;

        let report = StageReport {
            stage,
            input_rows,
            output_rows: exploded.rows.len(),
            childless: exploded.childless,
            failures,
            score_warnings,
            artifact,
        };

        Ok(StageOutput {
            rows: exploded.rows,
            report,
        })
    }
}

fn parse_document<D, K>(document: Value, check: &K) -> Result<D, String>
where
    D: DeserializeOwned,
    K: Fn(&D) -> Result<(), String>,
{
    let parsed: D = serde_json::from_value(document).map_err(|e| e.to_string())?;
    check(&parsed)?;
    Ok(parsed)
}
