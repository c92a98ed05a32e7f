//! Uploads table.
//!
//! One row per uploaded artwork. `base_image_path` holds whatever base image
//! URL was resolved at upload time, including the configured fallback.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(UPLOADS_SQL).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared("DROP TABLE IF EXISTS uploads CASCADE;")
            .await?;
        Ok(())
    }
}

const UPLOADS_SQL: &str = r"
CREATE TABLE uploads (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    original_file_path TEXT NOT NULL,
    base_image_path TEXT,
    prompt TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_uploads_original_file_path CHECK (length(trim(original_file_path)) > 0)
);

-- Latest-record lookups and newest-first listings per owner
CREATE INDEX idx_uploads_user_created ON uploads(user_id, created_at DESC);

CREATE TRIGGER trg_uploads_updated_at
BEFORE UPDATE ON uploads
FOR EACH ROW EXECUTE FUNCTION touch_updated_at();
";
