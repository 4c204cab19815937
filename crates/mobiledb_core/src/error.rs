//! Error types for MobileDB core.

use crate::entity::EntityKey;
use mobiledb_codec::CodecError;
use mobiledb_storage::StorageError;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in MobileDB core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// File-access error, propagated unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Line framing or JSON error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Persisted content is readable but inconsistent.
    #[error("storage corrupted: {message}")]
    Corrupted {
        /// Description of the corruption.
        message: String,
    },

    /// An `Updated` change targeted a key with no live record.
    #[error("invalid operation: update target absent for key {key}")]
    UpdateTargetAbsent {
        /// The key that was not found.
        key: EntityKey,
    },

    /// An `Added` change targeted a key that already has a live record.
    #[error("invalid operation: duplicate key {key}")]
    DuplicateKey {
        /// The key that already exists.
        key: EntityKey,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },

    /// A blocking task running a store operation panicked or was cancelled.
    #[error("store task failed: {message}")]
    TaskFailed {
        /// Description of the failure.
        message: String,
    },
}

impl CoreError {
    /// Creates a corruption error.
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a task failure error.
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// Returns `true` if the error reports malformed or inconsistent
    /// persisted content.
    #[must_use]
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Corrupted { .. } | Self::Codec(CodecError::Malformed { .. })
        )
    }
}
