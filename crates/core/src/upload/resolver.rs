//! Base image resolution.
//!
//! Every owner gets exactly one base image URL per upload, chosen in order:
//!
//! 1. the base image of the owner's most recent record, when non-empty
//! 2. a freshly generated image, stored with public-read visibility
//! 3. the configured fallback URL
//!
//! Generation faults never escape; they route through a recovery lookup and
//! then the fallback.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::repository::UploadRecordStore;
use super::types::{BaseImageSource, ResolvedBaseImage, UploadRecord};
use crate::generation::{GenerationError, ImageGenerator};
use crate::storage::keys::base_image_key;
use crate::storage::{ContentSource, ObjectStore, Visibility};

/// Resolves the base image paired with each upload.
pub struct BaseImageResolver<R, S, G> {
    records: Arc<R>,
    store: Arc<S>,
    generator: Arc<G>,
    fallback_url: String,
    generation_timeout: Duration,
}

impl<R, S, G> BaseImageResolver<R, S, G>
where
    R: UploadRecordStore,
    S: ObjectStore,
    G: ImageGenerator,
{
    /// Create a resolver.
    #[must_use]
    pub fn new(
        records: Arc<R>,
        store: Arc<S>,
        generator: Arc<G>,
        fallback_url: impl Into<String>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            records,
            store,
            generator,
            fallback_url: fallback_url.into(),
            generation_timeout,
        }
    }

    /// The configured fallback URL.
    #[must_use]
    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// Resolve a base image for `owner_id`. Never fails.
    pub async fn resolve(&self, owner_id: Uuid) -> ResolvedBaseImage {
        let latest = match self.records.find_latest_by_owner(owner_id).await {
            Ok(latest) => latest,
            Err(e) => {
                warn!(%owner_id, error = %e, "Base image lookup failed, recovering");
                return self.recover(owner_id).await;
            }
        };

        if let Some(url) = latest.as_ref().and_then(UploadRecord::usable_base_image) {
            debug!(%owner_id, "Reusing existing base image");
            return ResolvedBaseImage::new(url, BaseImageSource::Reused);
        }

        match self.generate_and_store().await {
            Ok(url) => ResolvedBaseImage::new(url, BaseImageSource::Generated),
            Err(e) => {
                warn!(%owner_id, error = %e, "Base image generation failed, recovering");
                self.recover(owner_id).await
            }
        }
    }

    async fn generate_and_store(&self) -> Result<String, GenerationError> {
        let image = tokio::time::timeout(self.generation_timeout, self.generator.generate())
            .await
            .map_err(|_| GenerationError::Timeout(self.generation_timeout.as_secs()))??;

        let key = base_image_key(&image.content_type, Utc::now());
        let url = self
            .store
            .store(
                ContentSource::Buffer {
                    bytes: image.bytes,
                    content_type: image.content_type,
                },
                &key,
                Visibility::PublicRead,
            )
            .await?;

        debug!(key = %key, "Generated base image stored");
        Ok(url)
    }

    /// Second lookup after a failure. Any error here degrades to the fallback.
    async fn recover(&self, owner_id: Uuid) -> ResolvedBaseImage {
        match self.records.find_latest_by_owner(owner_id).await {
            Ok(Some(record)) => {
                if let Some(url) = record.usable_base_image() {
                    debug!(%owner_id, "Recovered base image from latest record");
                    return ResolvedBaseImage::new(url, BaseImageSource::Reused);
                }
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%owner_id, error = %e, "Recovery lookup failed, using fallback");
            }
        }

        ResolvedBaseImage::new(self.fallback_url.as_str(), BaseImageSource::Fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::fakes::{
        FALLBACK_URL, FakeGenerator, FakeStore, InMemoryRecords, WEBP_DATA_URL,
    };

    type TestResolver = BaseImageResolver<InMemoryRecords, FakeStore, FakeGenerator>;

    fn resolver(
        records: &Arc<InMemoryRecords>,
        store: &Arc<FakeStore>,
        generator: &Arc<FakeGenerator>,
    ) -> TestResolver {
        BaseImageResolver::new(
            Arc::clone(records),
            Arc::clone(store),
            Arc::clone(generator),
            FALLBACK_URL,
            Duration::from_secs(30),
        )
    }

    #[tokio::test]
    async fn test_reuses_existing_base_image() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        records.seed(owner, Some("https://b.s3.r.amazonaws.com/base-image-7.webp"));
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::succeeding(WEBP_DATA_URL));

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.url, "https://b.s3.r.amazonaws.com/base-image-7.webp");
        assert_eq!(resolved.source, BaseImageSource::Reused);
        assert_eq!(generator.calls(), 0);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_empty_base_image_triggers_generation() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        records.seed(owner, Some(""));
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::succeeding(WEBP_DATA_URL));

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.source, BaseImageSource::Generated);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_generates_and_stores_new_base_image() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::succeeding(WEBP_DATA_URL));

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.source, BaseImageSource::Generated);
        assert_ne!(resolved.url, FALLBACK_URL);

        let keys = store.keys();
        assert_eq!(keys.len(), 1);
        assert!(keys[0].starts_with("base-image-"));
        assert!(keys[0].ends_with(".webp"));
        assert!(resolved.url.ends_with(&keys[0]));
        assert_eq!(store.content_types(), vec!["image/webp".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::hanging());

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.url, FALLBACK_URL);
        assert_eq!(resolved.source, BaseImageSource::Fallback);
        assert_eq!(records.lookups(), 2);
    }

    #[tokio::test]
    async fn test_malformed_payload_falls_back() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::succeeding("image/webp;base64,AAAA"));

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.url, FALLBACK_URL);
        assert!(store.keys().is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_falls_back() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        let store = Arc::new(FakeStore::failing_prefix("base-image-"));
        let generator = Arc::new(FakeGenerator::succeeding(WEBP_DATA_URL));

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.source, BaseImageSource::Fallback);
    }

    #[tokio::test]
    async fn test_recovery_picks_up_concurrent_record() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        records.seed_after_first_lookup(owner, "https://b.s3.r.amazonaws.com/base-image-9.png");
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::failing());

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.url, "https://b.s3.r.amazonaws.com/base-image-9.png");
        assert_eq!(resolved.source, BaseImageSource::Reused);
        assert_eq!(generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_lookup_failure_skips_generation() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        records.fail_lookups(usize::MAX);
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::succeeding(WEBP_DATA_URL));

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.url, FALLBACK_URL);
        assert_eq!(generator.calls(), 0);
        assert_eq!(records.lookups(), 2);
    }

    #[tokio::test]
    async fn test_recovery_error_is_swallowed() {
        let owner = Uuid::new_v4();
        let records = Arc::new(InMemoryRecords::default());
        // First lookup succeeds with nothing, the recovery lookup errors.
        records.fail_lookups_after(1);
        let store = Arc::new(FakeStore::default());
        let generator = Arc::new(FakeGenerator::failing());

        let resolved = resolver(&records, &store, &generator).resolve(owner).await;

        assert_eq!(resolved.url, FALLBACK_URL);
        assert_eq!(resolved.source, BaseImageSource::Fallback);
    }
}
