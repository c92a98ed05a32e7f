//! Upload repository for database operations.
//!
//! Implements the core's upload record store using SeaORM.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::debug;
use uuid::Uuid;

use crate::entities::uploads;
use atelier_core::upload::{NewUploadRecord, UploadError, UploadRecord, UploadRecordStore};

/// Upload repository implementation.
#[derive(Debug, Clone)]
pub struct UploadRepository {
    db: DatabaseConnection,
}

impl UploadRepository {
    /// Create a new upload repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl UploadRecordStore for UploadRepository {
    async fn find_latest_by_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Option<UploadRecord>, UploadError> {
        let model = uploads::Entity::find()
            .filter(uploads::Column::UserId.eq(owner_id))
            .order_by_desc(uploads::Column::CreatedAt)
            .order_by_desc(uploads::Column::Id)
            .one(&self.db)
            .await
            .map_err(|e| UploadError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn create(&self, input: NewUploadRecord) -> Result<UploadRecord, UploadError> {
        let now = Utc::now().into();
        let active_model = uploads::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(input.owner_id),
            original_file_path: Set(input.artwork_url),
            base_image_path: Set(input.base_image_url),
            prompt: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| UploadError::repository(e.to_string()))?;

        debug!(upload_id = %model.id, user_id = %model.user_id, "Upload record created");
        Ok(to_domain(model))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> Result<Vec<UploadRecord>, UploadError> {
        let models = uploads::Entity::find()
            .filter(uploads::Column::UserId.eq(owner_id))
            .order_by_desc(uploads::Column::CreatedAt)
            .order_by_desc(uploads::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| UploadError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }
}

/// Convert database model to domain record.
fn to_domain(model: uploads::Model) -> UploadRecord {
    UploadRecord {
        id: model.id,
        owner_id: model.user_id,
        artwork_url: model.original_file_path,
        base_image_url: model.base_image_path,
        prompt: model.prompt,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
