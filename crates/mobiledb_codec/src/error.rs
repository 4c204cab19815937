//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Failed to serialize a value.
    #[error("encoding failed: {message}")]
    Encode {
        /// Description of the encoding error.
        message: String,
    },

    /// A line could not be parsed as the expected value.
    #[error("malformed line {line}: {message}")]
    Malformed {
        /// 1-based physical line number.
        line: usize,
        /// Description of the parse error.
        message: String,
    },

    /// Writing encoded bytes to the sink failed.
    #[error("write failed: {message}")]
    Write {
        /// Description of the I/O error.
        message: String,
    },
}

impl CodecError {
    /// Create an encoding error.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create a malformed line error.
    pub fn malformed(line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            line,
            message: message.into(),
        }
    }

    /// Returns the offending line number for decode errors.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Malformed { line, .. } => Some(*line),
            _ => None,
        }
    }
}
