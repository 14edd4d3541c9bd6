use std::borrow::Cow;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::error::TableError;
use crate::rows::Record;

const IN_MEMORY: &str = "in-memory table";

/// Stage input: either a cache artifact on disk or a table already held by the caller.
#[derive(Debug, Clone)]
pub enum TableSource<'a, T: Clone> {
    Path(PathBuf),
    Rows(Cow<'a, [T]>),
}

impl<'a, T: Record> TableSource<'a, T> {
    /// Load (or borrow) the rows and check them against the table's contract.
    pub async fn resolve(self) -> Result<Cow<'a, [T]>, TableError> {
        let (origin, rows) = match self {
            TableSource::Path(path) => {
                let rows = read_table::<T>(&path).await?;
                (path.display().to_string(), Cow::Owned(rows))
            }
            TableSource::Rows(rows) => (IN_MEMORY.to_string(), rows),
        };

        if T::REQUIRES_ROWS && rows.is_empty() {
            return Err(TableError::Empty { origin });
        }
        for (index, row) in rows.iter().enumerate() {
            row.check_row().map_err(|message| TableError::Row {
                origin: origin.clone(),
                row: index + 1,
                message,
            })?;
        }

        Ok(rows)
    }
}

impl<T: Clone> From<PathBuf> for TableSource<'_, T> {
    fn from(path: PathBuf) -> Self {
        TableSource::Path(path)
    }
}

impl<T: Clone> From<&Path> for TableSource<'_, T> {
    fn from(path: &Path) -> Self {
        TableSource::Path(path.to_path_buf())
    }
}

impl<T: Clone> From<Vec<T>> for TableSource<'_, T> {
    fn from(rows: Vec<T>) -> Self {
        TableSource::Rows(Cow::Owned(rows))
    }
}

impl<'a, T: Clone> From<&'a [T]> for TableSource<'a, T> {
    fn from(rows: &'a [T]) -> Self {
        TableSource::Rows(Cow::Borrowed(rows))
    }
}

impl<'a, T: Clone> From<&'a Vec<T>> for TableSource<'a, T> {
    fn from(rows: &'a Vec<T>) -> Self {
        TableSource::Rows(Cow::Borrowed(rows.as_slice()))
    }
}

/// Read a header-delimited table, rejecting files whose header drifts from the contract.
pub async fn read_table<T: Record>(path: &Path) -> Result<Vec<T>, TableError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(TableError::Missing {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(TableError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let origin = path.display().to_string();
    let csv_error = |source| TableError::Csv {
        origin: origin.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(bytes.as_slice());

    let headers = reader.headers().map_err(csv_error)?.clone();
    T::check_header(&headers).map_err(|found| TableError::Header {
        origin: origin.clone(),
        expected: T::COLUMNS.join(","),
        found,
    })?;

    let rows = reader
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(csv_error)?;

    debug!(artifact = T::ARTIFACT, path = %origin, rows = rows.len(), "Loaded table");
    Ok(rows)
}
