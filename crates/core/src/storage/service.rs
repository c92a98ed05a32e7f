//! Storage service implementation using Apache OpenDAL.

use std::path::PathBuf;

use bytes::Bytes;
use opendal::{Operator, services};
use tracing::debug;

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;
use super::keys::content_type_for_key;

/// Who may fetch a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Anyone holding the URL; the returned URL is deterministic.
    PublicRead,
    /// Only holders of a time-limited presigned URL.
    Private,
}

/// Content handed to [`ObjectStore::store`].
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A file on local disk. The content type is derived from the key.
    File(PathBuf),
    /// An in-memory buffer with an explicit content type.
    Buffer {
        /// Object bytes.
        bytes: Bytes,
        /// MIME type recorded on the object.
        content_type: String,
    },
}

/// Durable blob storage.
///
/// Implemented by [`StorageService`]; the upload flow only depends on this
/// trait so tests can substitute an in-memory store.
pub trait ObjectStore: Send + Sync {
    /// Store content under `key` and return the URL it can be fetched from.
    ///
    /// No retry is attempted; failures propagate to the caller.
    fn store(
        &self,
        source: ContentSource,
        key: &str,
        visibility: Visibility,
    ) -> impl std::future::Future<Output = Result<String, StorageError>> + Send;
}

/// Storage service backed by an OpenDAL operator.
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl std::fmt::Debug for StorageService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageService")
            .field("provider", &self.config.provider.name())
            .field("bucket", &self.config.provider.bucket())
            .finish_non_exhaustive()
    }
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .access_key_id(access_key_id)
                    .secret_access_key(secret_access_key)
                    .region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
        }
    }

    /// Deterministic public URL of a key.
    ///
    /// `https://{bucket}.s3.{region}.amazonaws.com/{key}` for S3 unless a
    /// public base URL is configured.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        if let Some(base) = &self.config.public_base_url {
            return format!("{}/{key}", base.trim_end_matches('/'));
        }

        match &self.config.provider {
            StorageProvider::S3 { bucket, region, .. } => {
                format!("https://{bucket}.s3.{region}.amazonaws.com/{key}")
            }
            StorageProvider::LocalFs { root } => {
                format!("file://{}/{key}", root.display())
            }
        }
    }

    /// Time-limited download URL for a private object.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot presign or the request fails.
    pub async fn presign_download(&self, key: &str) -> Result<String, StorageError> {
        if !self.operator.info().full_capability().presign_read {
            return Err(StorageError::PresignUnsupported(self.provider_name()));
        }

        let presigned = self
            .operator
            .presign_read(key, self.config.presign_ttl)
            .await?;
        Ok(presigned.uri().to_string())
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> bool {
        self.operator.stat(key).await.is_ok()
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    async fn write(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        // Filesystem backends reject content-type metadata.
        let capability = self.operator.info().full_capability();
        if capability.write_with_content_type {
            self.operator
                .write_with(key, bytes)
                .content_type(content_type)
                .await?;
        } else {
            self.operator.write(key, bytes).await?;
        }
        Ok(())
    }
}

impl ObjectStore for StorageService {
    async fn store(
        &self,
        source: ContentSource,
        key: &str,
        visibility: Visibility,
    ) -> Result<String, StorageError> {
        if key.is_empty() || key.starts_with('/') {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let (bytes, content_type) = match source {
            ContentSource::File(path) => {
                let data =
                    tokio::fs::read(&path)
                        .await
                        .map_err(|e| StorageError::SourceUnreadable {
                            path: path.display().to_string(),
                            reason: e.to_string(),
                        })?;
                (Bytes::from(data), content_type_for_key(key).to_string())
            }
            ContentSource::Buffer {
                bytes,
                content_type,
            } => (bytes, content_type),
        };

        let size = bytes.len();
        self.write(key, bytes, &content_type).await?;
        debug!(key, size, content_type = %content_type, "Object stored");

        match visibility {
            Visibility::PublicRead => Ok(self.public_url(key)),
            Visibility::Private => self.presign_download(key).await,
        }
    }
}
