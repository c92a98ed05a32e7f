//! HTTP client for the generation capability.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::error::GenerationError;
use super::image::GeneratedImage;

/// Source of freshly generated base images.
pub trait ImageGenerator: Send + Sync {
    /// Request one new base image.
    fn generate(
        &self,
    ) -> impl std::future::Future<Output = Result<GeneratedImage, GenerationError>> + Send;
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(rename = "base64Image")]
    base64_image: Option<String>,
}

/// Generator that calls a remote HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpImageGenerator {
    http_client: reqwest::Client,
    url: Option<String>,
    timeout: Duration,
}

impl HttpImageGenerator {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a generator for `url`. `None` yields a generator that always
    /// fails with [`GenerationError::Disabled`].
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Option<String>, timeout: Duration) -> Result<Self, GenerationError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerationError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            url,
            timeout,
        })
    }

    /// Whether an endpoint is configured.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }
}

impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self) -> Result<GeneratedImage, GenerationError> {
        let Some(url) = &self.url else {
            return Err(GenerationError::Disabled);
        };

        let response = self
            .http_client
            .post(url)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenerationError::Timeout(self.timeout.as_secs())
                } else {
                    GenerationError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GenerationError::Status(status.as_u16()));
        }

        let body: GenerationResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.timeout.as_secs())
            } else {
                GenerationError::invalid_response(e.to_string())
            }
        })?;

        let data_url = body
            .base64_image
            .filter(|s| !s.is_empty())
            .ok_or_else(|| GenerationError::invalid_response("missing base64Image field"))?;

        let image = GeneratedImage::from_data_url(&data_url)?;
        debug!(
            content_type = %image.content_type,
            size = image.bytes.len(),
            "Base image generated"
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_generator_fails_fast() {
        let generator =
            HttpImageGenerator::new(None, HttpImageGenerator::DEFAULT_TIMEOUT).expect("client");

        assert!(!generator.is_enabled());
        assert!(matches!(
            generator.generate().await,
            Err(GenerationError::Disabled)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_request_error() {
        // Port 9 (discard) on localhost is closed on test machines.
        let generator = HttpImageGenerator::new(
            Some("http://127.0.0.1:9/generate-base-image".to_string()),
            Duration::from_secs(2),
        )
        .expect("client");

        assert!(generator.is_enabled());
        assert!(matches!(
            generator.generate().await,
            Err(GenerationError::Request(_) | GenerationError::Timeout(_))
        ));
    }

    #[test]
    fn test_response_field_name() {
        let body: GenerationResponse =
            serde_json::from_str(r#"{"base64Image":"data:image/webp;base64,AAAA"}"#).unwrap();
        assert_eq!(
            body.base64_image.as_deref(),
            Some("data:image/webp;base64,AAAA")
        );

        let empty: GenerationResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.base64_image.is_none());
    }
}
