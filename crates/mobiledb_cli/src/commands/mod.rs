//! CLI command implementations.

pub mod dump;
pub mod inspect;
pub mod verify;

use mobiledb_core::Envelope;
use mobiledb_storage::{DiskFileSystem, FileSystem, StorageError, StoragePath};
use std::path::Path;
use thiserror::Error;

/// A store file line decoded without knowing the entity type.
pub type StoreLine = Envelope<serde_json::Value>;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The store file does not exist.
    #[error("no store file found at {path}")]
    NotFound {
        /// The path given on the command line.
        path: String,
    },

    /// The store file failed verification.
    #[error("verification failed: {problems} problem(s)")]
    VerificationFailed {
        /// Number of malformed lines and duplicate identities.
        problems: usize,
    },

    /// File access failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Output could not be rendered as JSON.
    #[error("failed to render output: {0}")]
    Render(#[from] serde_json::Error),
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Reads a store file given as a native path.
pub fn read_store_file(path: &Path) -> CliResult<Vec<u8>> {
    let not_found = || CliError::NotFound {
        path: path.display().to_string(),
    };

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(not_found)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let fs = DiskFileSystem::new(dir);
    let logical = StoragePath::root().append_file(file_name)?;
    let bytes = match fs.read_all(&logical) {
        Ok(bytes) => bytes,
        Err(StorageError::NotFound { .. }) => return Err(not_found()),
        Err(e) => return Err(e.into()),
    };

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "read store file");
    Ok(bytes)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_existing_file() {
        let file = fixtures::store_file(fixtures::TWO_USERS);
        let bytes = read_store_file(file.path()).unwrap();
        assert_eq!(bytes, fixtures::TWO_USERS.as_bytes());
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_store_file(&dir.path().join("Nope.json")).unwrap_err();
        assert!(matches!(err, CliError::NotFound { .. }));
    }
}
