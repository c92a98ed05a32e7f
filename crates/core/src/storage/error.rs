//! Storage error types.

use thiserror::Error;

/// Failures while writing or addressing stored objects.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The local file handed to the store could not be read.
    #[error("failed to read source file {path}: {reason}")]
    SourceUnreadable {
        /// Path that was read.
        path: String,
        /// Underlying IO error.
        reason: String,
    },

    /// Keys must be non-empty and relative to the bucket root.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// The backend cannot hand out presigned URLs.
    #[error("presigned URLs are not supported by the {0} backend")]
    PresignUnsupported(&'static str),

    /// Operator could not be built from the provider settings.
    #[error("storage configuration error: {0}")]
    Configuration(String),

    /// The backend rejected or failed the request.
    #[error("storage operation failed: {0}")]
    Operation(String),
}

impl StorageError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an operation error.
    #[must_use]
    pub fn operation(msg: impl Into<String>) -> Self {
        Self::Operation(msg.into())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        Self::Operation(err.to_string())
    }
}
