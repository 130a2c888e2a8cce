use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::hashers;
use crate::models::{Algorithm, DigestResult};

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Failed to open {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("Failed to compute {algorithm}: {source}")]
    Read { algorithm: Algorithm, source: io::Error },
}

/// Compute hash of the file at path using streaming read.
/// This is synchronous; call it inside a spawned thread/task to keep UI responsive.
pub fn compute_file_hash(path: &Path, algorithm: Algorithm, chunk_size: usize) -> Result<String, HashError> {
    let open_error = |source| HashError::Open { path: path.to_path_buf(), source };
    let file = File::open(path).map_err(open_error)?;
    let metadata = file.metadata().map_err(open_error)?;
    if !metadata.is_file() {
        return Err(open_error(io::Error::new(io::ErrorKind::InvalidInput, "not a regular file")));
    }
    hashers::compute_hash_for_reader(file, algorithm, chunk_size)
        .map_err(|source| HashError::Read { algorithm, source })
}

/// Like [`compute_file_hash`], folding any error into the result's error text.
pub fn compute(path: &Path, algorithm: Algorithm, chunk_size: usize) -> DigestResult {
    match compute_file_hash(path, algorithm, chunk_size) {
        Ok(hex) => {
            debug_assert_eq!(hex.len(), algorithm.hex_len());
            DigestResult::success(algorithm, hex)
        }
        Err(err) => {
            tracing::warn!(%algorithm, "{err}");
            DigestResult::failure(algorithm, err.to_string())
        }
    }
}
