//! Upload error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

/// Faults surfaced by the upload flow.
///
/// Generation faults never appear here; the base image resolver absorbs them.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Missing or malformed caller input.
    #[error("validation error: {0}")]
    Validation(String),

    /// The temporary upload file vanished before it could be stored.
    #[error("temporary upload file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// Object storage transfer failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Record store operation failed.
    #[error("repository error: {0}")]
    Repository(String),
}

impl UploadError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a repository error.
    #[must_use]
    pub fn repository(msg: impl Into<String>) -> Self {
        Self::Repository(msg.into())
    }

    /// Whether the caller can fix the request and retry.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
