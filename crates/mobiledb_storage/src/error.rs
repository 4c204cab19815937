//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The requested file does not exist.
    #[error("file not found: {path}")]
    NotFound {
        /// The logical path that was requested.
        path: String,
    },

    /// A logical path or path segment is malformed.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The offending path or segment.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl StorageError {
    /// Creates a not-found error for the given path.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
