//! Record store abstraction.

use uuid::Uuid;

use super::error::UploadError;
use super::types::{NewUploadRecord, UploadRecord};

/// Repository trait for upload persistence.
///
/// Implemented by the db crate. Every failure maps to
/// [`UploadError::Repository`].
pub trait UploadRecordStore: Send + Sync {
    /// Most recent record of an owner, by creation time.
    fn find_latest_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Option<UploadRecord>, UploadError>> + Send;

    /// Persist a new record.
    fn create(
        &self,
        input: NewUploadRecord,
    ) -> impl std::future::Future<Output = Result<UploadRecord, UploadError>> + Send;

    /// All records of an owner, newest first.
    fn list_by_owner(
        &self,
        owner_id: Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<UploadRecord>, UploadError>> + Send;
}
