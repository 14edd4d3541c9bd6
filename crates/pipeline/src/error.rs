use enrich::ClientError;
use fetch::RemoteCallError;
use table::TableError;
use thiserror::Error;

use crate::state::Stage;

/// A response document that does not have the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record {record}: {message}")]
pub struct SchemaError {
    /// Position of the input whose response was rejected.
    pub record: usize,
    pub message: String,
}

/// Why a stage failed. Every variant names the stage; the wrapped error names
/// the failing input and the underlying cause.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Missing or malformed input table, detected before any remote call.
    #[error("{stage} stage: invalid input: {source}")]
    Input {
        stage: Stage,
        #[source]
        source: TableError,
    },

    /// Transport, auth or rate-limit failure from the enrichment client.
    #[error("{stage} stage: {source}")]
    RemoteCall {
        stage: Stage,
        #[source]
        source: RemoteCallError<ClientError>,
    },

    /// A response that does not match the expected document shape.
    #[error("{stage} stage: malformed response for `{input}`: {source}")]
    Schema {
        stage: Stage,
        input: String,
        #[source]
        source: SchemaError,
    },

    #[error("{stage} stage: failed to write artifact: {source}")]
    Artifact {
        stage: Stage,
        #[source]
        source: TableError,
    },
}

impl EtlError {
    pub fn stage(&self) -> Stage {
        match self {
            EtlError::Input { stage, .. }
            | EtlError::RemoteCall { stage, .. }
            | EtlError::Schema { stage, .. }
            | EtlError::Artifact { stage, .. } => *stage,
        }
    }

    /// Whether a caller-supplied retry policy could reasonably rerun the stage.
    pub fn is_retryable(&self) -> bool {
        match self {
            EtlError::RemoteCall { source, .. } => source.source.is_retryable(),
            _ => false,
        }
    }
}
