//! Object key derivation.
//!
//! Keys are flat (no directories) and embed the upload time in unix
//! milliseconds so that repeated uploads of the same file do not collide
//! within a bucket.

use chrono::{DateTime, Utc};

/// Prefix of artwork object keys.
pub const ARTWORK_PREFIX: &str = "artwork";
/// Prefix of generated base image object keys.
pub const BASE_IMAGE_PREFIX: &str = "base-image";
/// Extension used when a content type has no subtype.
pub const DEFAULT_BASE_IMAGE_EXTENSION: &str = "webp";

/// Key for an uploaded artwork: `artwork-{millis}-{sanitized filename}`.
#[must_use]
pub fn artwork_key(original_filename: &str, now: DateTime<Utc>) -> String {
    format!(
        "{ARTWORK_PREFIX}-{}-{}",
        now.timestamp_millis(),
        sanitize_filename(original_filename)
    )
}

/// Key for a generated base image: `base-image-{millis}.{subtype}`.
#[must_use]
pub fn base_image_key(content_type: &str, now: DateTime<Utc>) -> String {
    format!(
        "{BASE_IMAGE_PREFIX}-{}.{}",
        now.timestamp_millis(),
        extension_for_content_type(content_type)
    )
}

/// File extension for a MIME type, taken from its subtype.
///
/// `image/webp` becomes `webp`; parameters are dropped and anything that
/// cannot be used in a key falls back to `webp`.
#[must_use]
pub fn extension_for_content_type(content_type: &str) -> String {
    content_type
        .split_once('/')
        .map(|(_, subtype)| subtype.split(';').next().unwrap_or_default().trim())
        .filter(|subtype| !subtype.is_empty())
        .map_or_else(
            || DEFAULT_BASE_IMAGE_EXTENSION.to_string(),
            sanitize_filename,
        )
}

/// Content type for a key, based on its extension.
#[must_use]
pub fn content_type_for_key(key: &str) -> &'static str {
    let extension = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

/// Sanitize filename for storage key.
///
/// Only allows ASCII alphanumeric characters, dots, hyphens, and underscores.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn fixed_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_751_145_561_950)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn test_artwork_key() {
        assert_eq!(
            artwork_key("sunset.png", fixed_time()),
            "artwork-1751145561950-sunset.png"
        );
        assert_eq!(
            artwork_key("my sketch (1).jpg", fixed_time()),
            "artwork-1751145561950-my_sketch__1_.jpg"
        );
    }

    #[test]
    fn test_base_image_key() {
        assert_eq!(
            base_image_key("image/webp", fixed_time()),
            "base-image-1751145561950.webp"
        );
        assert_eq!(
            base_image_key("image/png", fixed_time()),
            "base-image-1751145561950.png"
        );
    }

    #[rstest]
    #[case("image/webp", "webp")]
    #[case("image/jpeg; charset=binary", "jpeg")]
    #[case("image/", "webp")]
    #[case("image", "webp")]
    #[case("image/svg+xml", "svg_xml")]
    fn test_extension_for_content_type(#[case] content_type: &str, #[case] expected: &str) {
        assert_eq!(extension_for_content_type(content_type), expected);
    }

    #[rstest]
    #[case("artwork-1-photo.JPG", "image/jpeg")]
    #[case("artwork-1-photo.jpeg", "image/jpeg")]
    #[case("artwork-1-photo.png", "image/png")]
    #[case("artwork-1-photo.gif", "application/octet-stream")]
    #[case("artwork-1-photo", "application/octet-stream")]
    fn test_content_type_for_key(#[case] key: &str, #[case] expected: &str) {
        assert_eq!(content_type_for_key(key), expected);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("sunset.png"), "sunset.png");
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_filename("日本語.png"), "___.png");
    }
}
