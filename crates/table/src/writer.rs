use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::info;

use crate::error::TableError;
use crate::rows::Record;

/// A cache artifact that has been fully written.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: PathBuf,
    pub rows: usize,
    /// Hex SHA-256 of the file contents.
    pub digest: String,
}

/// Serialize rows under the fixed header. The header is written even for an empty table.
pub fn encode<T: Record>(rows: &[T]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(T::COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.into_inner().map_err(|e| e.into_error().into())
}

pub fn artifact_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Write the artifact next to its final location and rename it into place,
/// so readers never observe a partially written table.
pub async fn write_artifact<T: Record>(path: &Path, rows: &[T]) -> Result<Artifact, TableError> {
    let bytes = encode(rows).map_err(|source| TableError::Csv {
        origin: path.display().to_string(),
        source,
    })?;
    let io_error = |source| TableError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(io_error)?;
    }

    let mut staging = path.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    fs::write(&staging, &bytes).await.map_err(io_error)?;
    fs::rename(&staging, path).await.map_err(io_error)?;

    let digest = artifact_digest(&bytes);
    info!(
        artifact = T::ARTIFACT,
        path = %path.display(),
        rows = rows.len(),
        digest = %digest,
        "Artifact written"
    );

    Ok(Artifact {
        path: path.to_path_buf(),
        rows: rows.len(),
        digest,
    })
}
