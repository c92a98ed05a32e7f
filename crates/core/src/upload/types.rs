//! Upload domain types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extensions accepted for artwork files.
pub const ALLOWED_ARTWORK_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png"];

/// A persisted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRecord {
    /// Record ID.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Public URL of the stored artwork.
    pub artwork_url: String,
    /// URL of the base image paired with the artwork.
    pub base_image_url: Option<String>,
    /// Generation prompt, never written by the upload flow.
    pub prompt: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl UploadRecord {
    /// The stored base image URL, exactly as persisted, unless it is empty.
    #[must_use]
    pub fn usable_base_image(&self) -> Option<&str> {
        self.base_image_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Input for creating an upload record.
#[derive(Debug, Clone)]
pub struct NewUploadRecord {
    /// Owning user.
    pub owner_id: Uuid,
    /// Public URL of the stored artwork.
    pub artwork_url: String,
    /// Base image URL.
    pub base_image_url: Option<String>,
}

/// A file written to local temporary storage by the HTTP layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Location of the temporary file.
    pub path: PathBuf,
    /// Filename supplied by the client.
    pub original_name: String,
}

/// Where a resolved base image came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseImageSource {
    /// Taken from the owner's latest record.
    Reused,
    /// Freshly generated and stored.
    Generated,
    /// The configured fallback URL.
    Fallback,
}

/// Outcome of base image resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBaseImage {
    /// URL to persist.
    pub url: String,
    /// How it was obtained.
    pub source: BaseImageSource,
}

impl ResolvedBaseImage {
    pub(crate) fn new(url: impl Into<String>, source: BaseImageSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// Result of a completed upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    /// ID of the new record.
    pub id: Uuid,
    /// Public URL of the artwork.
    pub artwork_url: String,
    /// Base image URL stored with the record.
    pub base_image_url: String,
    /// Whether a base image URL is present.
    pub has_base_image: bool,
    /// Whether the base image is the configured fallback.
    pub using_fallback: bool,
    /// How the base image was obtained.
    #[serde(skip)]
    pub source: BaseImageSource,
}

impl UploadResult {
    /// Build a result from a persisted record.
    ///
    /// `using_fallback` compares the stored URL with the fallback constant, so
    /// a reused fallback is still reported as a fallback.
    #[must_use]
    pub fn from_record(record: &UploadRecord, source: BaseImageSource, fallback_url: &str) -> Self {
        let base_image_url = record.base_image_url.clone().unwrap_or_default();
        Self {
            id: record.id,
            artwork_url: record.artwork_url.clone(),
            has_base_image: !base_image_url.is_empty(),
            using_fallback: base_image_url == fallback_url,
            base_image_url,
            source,
        }
    }

    /// Human readable summary for API responses.
    #[must_use]
    pub fn message(&self) -> &'static str {
        if self.using_fallback {
            "Artwork uploaded successfully (using fallback base image)"
        } else {
            match self.source {
                BaseImageSource::Generated => "Artwork and base image uploaded successfully",
                BaseImageSource::Reused | BaseImageSource::Fallback => {
                    "Artwork uploaded successfully (using existing base image)"
                }
            }
        }
    }
}

/// Whether a filename carries an accepted artwork extension.
#[must_use]
pub fn has_artwork_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(stem, ext)| {
            !stem.is_empty()
                && ALLOWED_ARTWORK_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(base: Option<&str>) -> UploadRecord {
        let now = Utc::now();
        UploadRecord {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            artwork_url: "https://b.s3.r.amazonaws.com/artwork-1-a.png".to_string(),
            base_image_url: base.map(str::to_string),
            prompt: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    #[case("sunset.png", true)]
    #[case("sunset.JPG", true)]
    #[case("photo.jpeg", true)]
    #[case("anim.gif", false)]
    #[case("archive.png.zip", false)]
    #[case("png", false)]
    #[case(".png", false)]
    fn test_has_artwork_extension(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(has_artwork_extension(name), expected);
    }

    #[rstest]
    #[case(Some("https://x/base.webp"), Some("https://x/base.webp"))]
    #[case(Some(" https://x/base.webp "), Some(" https://x/base.webp "))]
    #[case(Some("   "), Some("   "))]
    #[case(Some(""), None)]
    #[case(None, None)]
    fn test_usable_base_image(#[case] stored: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(record(stored).usable_base_image(), expected);
    }

    #[test]
    fn test_result_flags_fallback() {
        let fallback = "https://static.example.com/default-base.png";
        let result = UploadResult::from_record(
            &record(Some(fallback)),
            BaseImageSource::Fallback,
            fallback,
        );

        assert!(result.has_base_image);
        assert!(result.using_fallback);
        assert_eq!(
            result.message(),
            "Artwork uploaded successfully (using fallback base image)"
        );
    }

    #[test]
    fn test_result_generated_message() {
        let result = UploadResult::from_record(
            &record(Some("https://b.s3.r.amazonaws.com/base-image-1.webp")),
            BaseImageSource::Generated,
            "https://static.example.com/default-base.png",
        );

        assert!(!result.using_fallback);
        assert_eq!(result.message(), "Artwork and base image uploaded successfully");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = UploadResult::from_record(
            &record(Some("https://x/base.webp")),
            BaseImageSource::Reused,
            "https://fallback",
        );
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["baseImageUrl"], "https://x/base.webp");
        assert_eq!(json["hasBaseImage"], true);
        assert_eq!(json["usingFallback"], false);
        assert!(json.get("source").is_none());
    }
}
