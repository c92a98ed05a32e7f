//! Upload orchestration.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use super::error::UploadError;
use super::repository::UploadRecordStore;
use super::resolver::BaseImageResolver;
use super::temp::TempFileGuard;
use super::types::{NewUploadRecord, UploadRecord, UploadResult, UploadedFile};
use crate::generation::ImageGenerator;
use crate::storage::keys::artwork_key;
use crate::storage::{ContentSource, ObjectStore, Visibility};

/// Drives an artwork upload from temporary file to persisted record.
pub struct UploadService<R, S, G> {
    records: Arc<R>,
    store: Arc<S>,
    resolver: BaseImageResolver<R, S, G>,
}

impl<R, S, G> UploadService<R, S, G>
where
    R: UploadRecordStore,
    S: ObjectStore,
    G: ImageGenerator,
{
    /// Create a new upload service.
    #[must_use]
    pub fn new(
        records: Arc<R>,
        store: Arc<S>,
        generator: Arc<G>,
        fallback_url: impl Into<String>,
        generation_timeout: Duration,
    ) -> Self {
        let resolver = BaseImageResolver::new(
            Arc::clone(&records),
            Arc::clone(&store),
            generator,
            fallback_url,
            generation_timeout,
        );
        Self {
            records,
            store,
            resolver,
        }
    }

    /// Store an uploaded artwork, pair it with a base image and persist it.
    ///
    /// The temporary file is removed on every exit path.
    ///
    /// # Errors
    ///
    /// - `Validation` when no file is given or the owner is nil
    /// - `MissingInput` when the temporary file is gone
    /// - `Storage` when the artwork cannot be stored (nothing is persisted)
    /// - `Repository` when the record cannot be written (the stored artwork is
    ///   left in place)
    pub async fn handle_upload(
        &self,
        owner_id: Uuid,
        file: Option<UploadedFile>,
    ) -> Result<UploadResult, UploadError> {
        let _cleanup = TempFileGuard::new(file.as_ref().map(|f| f.path.clone()));

        let file = file.ok_or_else(|| UploadError::validation("no artwork file provided"))?;
        if owner_id.is_nil() {
            return Err(UploadError::validation("an authenticated owner is required"));
        }
        if !tokio::fs::try_exists(&file.path).await.unwrap_or(false) {
            return Err(UploadError::MissingInput(file.path));
        }

        let key = artwork_key(&file.original_name, Utc::now());
        let artwork_url = self
            .store
            .store(ContentSource::File(file.path.clone()), &key, Visibility::PublicRead)
            .await
            .inspect_err(|e| error!(%owner_id, key = %key, error = %e, "Artwork storage failed"))?;

        let base_image = self.resolver.resolve(owner_id).await;

        let record = self
            .records
            .create(NewUploadRecord {
                owner_id,
                artwork_url,
                base_image_url: Some(base_image.url),
            })
            .await
            .inspect_err(|e| {
                error!(%owner_id, key = %key, error = %e, "Upload record could not be persisted");
            })?;

        let result =
            UploadResult::from_record(&record, base_image.source, self.resolver.fallback_url());
        info!(
            %owner_id,
            upload_id = %result.id,
            key = %key,
            source = ?result.source,
            using_fallback = result.using_fallback,
            "Artwork uploaded"
        );
        Ok(result)
    }

    /// All uploads of an owner, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the record store fails.
    pub async fn list_uploads(&self, owner_id: Uuid) -> Result<Vec<UploadRecord>, UploadError> {
        self.records.list_by_owner(owner_id).await
    }

    /// The configured fallback base image URL.
    #[must_use]
    pub fn fallback_url(&self) -> &str {
        self.resolver.fallback_url()
    }
}
