//! Storage configuration types.

use std::path::PathBuf;
use std::time::Duration;

/// Where objects are written.
#[derive(Debug, Clone)]
pub enum StorageProvider {
    /// AWS S3 or an S3-compatible service.
    S3 {
        /// Custom endpoint; AWS is used when absent.
        endpoint: Option<String>,
        /// Bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region, e.g. `ap-south-1`.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create an S3 provider against AWS.
    #[must_use]
    pub fn s3(
        bucket: impl Into<String>,
        region: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint: None,
            bucket: bucket.into(),
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Point an S3 provider at a custom endpoint. No-op for other providers.
    #[must_use]
    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        if let Self::S3 { endpoint, .. } = &mut self {
            *endpoint = Some(url.into());
        }
        self
    }

    /// Short backend name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
        }
    }

    /// Bucket name, or the root directory for local storage.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } => bucket,
            Self::LocalFs { root } => root.to_str().unwrap_or("local"),
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend to write to.
    pub provider: StorageProvider,
    /// Base for public object URLs, replacing the provider default.
    pub public_base_url: Option<String>,
    /// Lifetime of URLs returned for private objects.
    pub presign_ttl: Duration,
}

impl StorageConfig {
    /// One hour.
    pub const DEFAULT_PRESIGN_TTL: Duration = Duration::from_secs(3600);

    /// Create a config with the default presign lifetime and provider URLs.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            public_base_url: None,
            presign_ttl: Self::DEFAULT_PRESIGN_TTL,
        }
    }

    /// Override the base of public object URLs.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }

    /// Change how long presigned URLs stay valid.
    #[must_use]
    pub fn with_presign_ttl(mut self, ttl: Duration) -> Self {
        self.presign_ttl = ttl;
        self
    }
}
