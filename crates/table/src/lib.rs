pub mod error;
pub mod reader;
pub mod rows;
pub mod writer;

pub use error::TableError;
pub use reader::{TableSource, read_table};
pub use rows::{EntityAnnotation, PlaceId, Record, Review, SentimentLabel, SentimentSentence};
pub use writer::{Artifact, artifact_digest, encode, write_artifact};
