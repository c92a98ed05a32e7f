//! Inline image payloads.

use base64::{Engine, engine::general_purpose::STANDARD};
use bytes::Bytes;

use super::error::GenerationError;
use crate::storage::keys::extension_for_content_type;

/// A decoded image returned by the generation capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// MIME type declared by the data URL.
    pub content_type: String,
    /// Decoded image bytes.
    pub bytes: Bytes,
}

impl GeneratedImage {
    /// Parse a `data:<content-type>;base64,<payload>` string.
    ///
    /// Both the content type and the payload must be non-empty and the
    /// string must not contain line breaks.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::InvalidResponse` for any other shape and
    /// `GenerationError::Decode` when the payload is not base64.
    pub fn from_data_url(data_url: &str) -> Result<Self, GenerationError> {
        if data_url.contains(['\n', '\r']) {
            return Err(GenerationError::invalid_response(
                "data URL contains line breaks",
            ));
        }

        let (content_type, payload) = data_url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .filter(|(content_type, payload)| !content_type.is_empty() && !payload.is_empty())
            .ok_or_else(|| {
                GenerationError::invalid_response("expected data:<content-type>;base64,<payload>")
            })?;

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| GenerationError::Decode(e.to_string()))?;

        Ok(Self {
            content_type: content_type.to_string(),
            bytes: Bytes::from(bytes),
        })
    }

    /// File extension for the image, derived from its content type.
    #[must_use]
    pub fn extension(&self) -> String {
        extension_for_content_type(&self.content_type)
    }
}
