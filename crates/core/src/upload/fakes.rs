//! In-memory collaborators for upload tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use chrono::Utc;
use uuid::Uuid;

use super::error::UploadError;
use super::repository::UploadRecordStore;
use super::types::{NewUploadRecord, UploadRecord};
use crate::generation::{GeneratedImage, GenerationError, ImageGenerator};
use crate::storage::keys::content_type_for_key;
use crate::storage::{ContentSource, ObjectStore, StorageError, Visibility};

pub const FALLBACK_URL: &str = "https://static.example.com/default-base.png";
pub const WEBP_DATA_URL: &str = "data:image/webp;base64,AAAA";
pub const BUCKET_URL: &str = "https://test-bucket.s3.us-east-1.amazonaws.com";

fn record(owner_id: Uuid, artwork_url: &str, base_image_url: Option<&str>) -> UploadRecord {
    let now = Utc::now();
    UploadRecord {
        id: Uuid::new_v4(),
        owner_id,
        artwork_url: artwork_url.to_string(),
        base_image_url: base_image_url.map(str::to_string),
        prompt: None,
        created_at: now,
        updated_at: now,
    }
}

/// Record store; later entries are newer.
pub struct InMemoryRecords {
    records: Mutex<Vec<UploadRecord>>,
    pending: Mutex<Option<UploadRecord>>,
    lookups: AtomicUsize,
    fail_first: AtomicUsize,
    fail_after: AtomicUsize,
    fail_create: AtomicBool,
}

impl Default for InMemoryRecords {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            pending: Mutex::new(None),
            lookups: AtomicUsize::new(0),
            fail_first: AtomicUsize::new(0),
            fail_after: AtomicUsize::new(usize::MAX),
            fail_create: AtomicBool::new(false),
        }
    }
}

impl InMemoryRecords {
    pub fn seed(&self, owner_id: Uuid, base_image_url: Option<&str>) -> UploadRecord {
        let seeded = record(owner_id, &format!("{BUCKET_URL}/artwork-0-old.png"), base_image_url);
        self.records.lock().unwrap().push(seeded.clone());
        seeded
    }

    /// Simulates a concurrent upload landing between the first lookup and recovery.
    pub fn seed_after_first_lookup(&self, owner_id: Uuid, base_image_url: &str) {
        *self.pending.lock().unwrap() = Some(record(
            owner_id,
            &format!("{BUCKET_URL}/artwork-0-concurrent.png"),
            Some(base_image_url),
        ));
    }

    /// Fail the first `n` lookups.
    pub fn fail_lookups(&self, n: usize) {
        self.fail_first.store(n, Ordering::SeqCst);
    }

    /// Fail every lookup after the first `n`.
    pub fn fail_lookups_after(&self, n: usize) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    pub fn fail_create(&self) {
        self.fail_create.store(true, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn all(&self) -> Vec<UploadRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl UploadRecordStore for InMemoryRecords {
    async fn find_latest_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<UploadRecord>, UploadError> {
        let index = self.lookups.fetch_add(1, Ordering::SeqCst);

        let outcome = if index < self.fail_first.load(Ordering::SeqCst)
            || index >= self.fail_after.load(Ordering::SeqCst)
        {
            Err(UploadError::repository("connection reset"))
        } else {
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|r| r.owner_id == owner_id)
                .cloned())
        };

        if index == 0 {
            if let Some(pending) = self.pending.lock().unwrap().take() {
                self.records.lock().unwrap().push(pending);
            }
        }

        outcome
    }

    async fn create(&self, input: NewUploadRecord) -> Result<UploadRecord, UploadError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(UploadError::repository("insert failed"));
        }

        let created = record(
            input.owner_id,
            &input.artwork_url,
            input.base_image_url.as_deref(),
        );
        self.records.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<UploadRecord>, UploadError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect())
    }
}

/// Object store that keeps keys and content types.
#[derive(Default)]
pub struct FakeStore {
    stored: Mutex<Vec<(String, String, Visibility)>>,
    fail_prefix: Option<String>,
}

impl FakeStore {
    /// Fail every key starting with `prefix`.
    pub fn failing_prefix(prefix: &str) -> Self {
        Self {
            stored: Mutex::new(Vec::new()),
            fail_prefix: Some(prefix.to_string()),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(key, _, _)| key.clone())
            .collect()
    }

    pub fn content_types(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(_, content_type, _)| content_type.clone())
            .collect()
    }

    pub fn visibilities(&self) -> Vec<Visibility> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(_, _, visibility)| *visibility)
            .collect()
    }
}

impl ObjectStore for FakeStore {
    async fn store(
        &self,
        source: ContentSource,
        key: &str,
        visibility: Visibility,
    ) -> Result<String, StorageError> {
        if self
            .fail_prefix
            .as_deref()
            .is_some_and(|prefix| key.starts_with(prefix))
        {
            return Err(StorageError::operation("access denied"));
        }

        let content_type = match source {
            ContentSource::File(path) => {
                tokio::fs::read(&path)
                    .await
                    .map_err(|e| StorageError::SourceUnreadable {
                        path: path.display().to_string(),
                        reason: e.to_string(),
                    })?;
                content_type_for_key(key).to_string()
            }
            ContentSource::Buffer { content_type, .. } => content_type,
        };

        self.stored
            .lock()
            .unwrap()
            .push((key.to_string(), content_type, visibility));
        Ok(format!("{BUCKET_URL}/{key}"))
    }
}

enum Behaviour {
    Succeeds(String),
    Fails,
    Hangs,
}

/// Scripted generator.
pub struct FakeGenerator {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl FakeGenerator {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn succeeding(data_url: &str) -> Self {
        Self::with(Behaviour::Succeeds(data_url.to_string()))
    }

    pub fn failing() -> Self {
        Self::with(Behaviour::Fails)
    }

    pub fn hanging() -> Self {
        Self::with(Behaviour::Hangs)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ImageGenerator for FakeGenerator {
    async fn generate(&self) -> Result<GeneratedImage, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            Behaviour::Succeeds(data_url) => GeneratedImage::from_data_url(data_url),
            Behaviour::Fails => Err(GenerationError::Status(502)),
            Behaviour::Hangs => std::future::pending().await,
        }
    }
}
