use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("input file {} does not exist", path.display())]
    Missing { path: PathBuf },

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed csv in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("{origin} has columns [{found}], expected [{expected}]")]
    Header {
        origin: String,
        expected: String,
        found: String,
    },

    #[error("{origin} has no rows")]
    Empty { origin: String },

    #[error("{origin} row {row}: {message}")]
    Row {
        origin: String,
        row: usize,
        message: String,
    },
}
