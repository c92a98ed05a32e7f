//! Generation error types.

use thiserror::Error;

use crate::storage::StorageError;

/// Failures of the remote generation capability.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No endpoint is configured.
    #[error("base image generation is not configured")]
    Disabled,

    /// The call did not finish in time.
    #[error("generation timed out after {0} seconds")]
    Timeout(u64),

    /// The request could not be sent or the body not read.
    #[error("generation request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status.
    #[error("generation endpoint returned status {0}")]
    Status(u16),

    /// The body did not carry a well-formed inline image.
    #[error("invalid generation response: {0}")]
    InvalidResponse(String),

    /// The inline payload was not valid base64.
    #[error("failed to decode generated image: {0}")]
    Decode(String),

    /// The decoded image could not be stored.
    #[error("failed to store generated image: {0}")]
    Storage(#[from] StorageError),
}

impl GenerationError {
    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
