//! Artwork upload routes.
//!
//! The multipart part is streamed to a uniquely named file under the
//! configured temp directory and handed to the upload orchestrator, which
//! owns its removal from then on.

use std::path::{Path, PathBuf};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{error_response, from_upload_error},
    middleware::AuthUser,
};
use atelier_core::upload::{
    ALLOWED_ARTWORK_EXTENSIONS, TempFileGuard, UploadedFile, has_artwork_extension,
};
use atelier_shared::{AppError, config::UploadSettings};

/// Multipart field carrying the artwork.
pub const ARTWORK_FIELD: &str = "artwork";

/// Room for multipart boundaries and part headers on top of the file limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Creates the upload routes. Bodies are capped at `max_file_size` plus
/// multipart framing.
pub fn routes(max_file_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload/artwork",
            post(upload_artwork).layer(DefaultBodyLimit::max(
                max_file_size.saturating_add(MULTIPART_OVERHEAD),
            )),
        )
        .route("/upload/logs", get(list_uploads))
        .route("/user/uploads", get(list_uploads))
}

/// An artwork written to the temp directory.
struct StagedArtwork {
    file: UploadedFile,
    // Removes the file if the request ends before the orchestrator takes over.
    cleanup: TempFileGuard,
}

/// Lowercased MIME type without parameters.
fn normalize_mime_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether a part's MIME type is an accepted image type.
fn is_artwork_mime_type(content_type: &str) -> bool {
    normalize_mime_type(content_type)
        .strip_prefix("image/")
        .is_some_and(|subtype| ALLOWED_ARTWORK_EXTENSIONS.contains(&subtype))
}

/// `artwork-<millis>-<random>.<ext>` inside `dir`.
fn temp_file_path(dir: &Path, original_name: &str) -> PathBuf {
    let extension = original_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    dir.join(format!(
        "artwork-{}-{}.{extension}",
        Utc::now().timestamp_millis(),
        rand::random::<u32>()
    ))
}

fn multipart_error(err: &MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Upload exceeds the maximum allowed size".into())
    } else {
        AppError::Validation(format!("Failed to read multipart body: {}", err.body_text()))
    }
}

fn too_large(max_file_size: usize) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File size exceeds maximum allowed size of {} MB",
        max_file_size / 1024 / 1024
    ))
}

/// Reads the single `artwork` part into a temp file.
///
/// `Ok(None)` when the form carries no artwork part.
async fn stage_artwork(
    mut multipart: Multipart,
    settings: &UploadSettings,
) -> Result<Option<StagedArtwork>, AppError> {
    let mut staged: Option<StagedArtwork> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        if field.name() != Some(ARTWORK_FIELD) {
            continue;
        }
        if staged.is_some() {
            return Err(AppError::Validation(format!(
                "Multiple '{ARTWORK_FIELD}' fields are not allowed"
            )));
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if !is_artwork_mime_type(&content_type) || !has_artwork_extension(&original_name) {
            return Err(AppError::UnsupportedFileType(
                "Only JPEG and PNG images are allowed".into(),
            ));
        }

        let path = temp_file_path(Path::new(&settings.temp_dir), &original_name);
        let cleanup = TempFileGuard::new(Some(path.clone()));
        let mut out = tokio::fs::File::create(&path)
            .await
            .map_err(|e| AppError::Internal(format!("cannot create temp file: {e}")))?;

        let mut written = 0usize;
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(&e))? {
            written = written.saturating_add(chunk.len());
            if written > settings.max_file_size {
                return Err(too_large(settings.max_file_size));
            }
            out.write_all(&chunk)
                .await
                .map_err(|e| AppError::Internal(format!("cannot write temp file: {e}")))?;
        }
        out.flush()
            .await
            .map_err(|e| AppError::Internal(format!("cannot write temp file: {e}")))?;

        staged = Some(StagedArtwork {
            file: UploadedFile {
                path,
                original_name,
            },
            cleanup,
        });
    }

    Ok(staged)
}

/// POST /upload/artwork - Store an artwork and pair it with a base image.
async fn upload_artwork(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Response {
    let staged = match stage_artwork(multipart, &state.upload_settings).await {
        Ok(staged) => staged,
        Err(e) => {
            warn!(user_id = %auth.user_id(), error = %e, "Artwork rejected");
            return error_response(&e);
        }
    };

    let (file, _cleanup) = match staged {
        Some(StagedArtwork { file, cleanup }) => (Some(file), Some(cleanup)),
        None => (None, None),
    };

    match state.uploads.handle_upload(auth.user_id(), file).await {
        Ok(result) => {
            info!(
                user_id = %auth.user_id(),
                upload_id = %result.id,
                using_fallback = result.using_fallback,
                "Artwork upload completed"
            );
            (
                StatusCode::CREATED,
                Json(json!({
                    "message": result.message(),
                    "upload": result,
                })),
            )
                .into_response()
        }
        Err(e) => {
            let err = from_upload_error(e);
            if err.is_client_error() {
                warn!(user_id = %auth.user_id(), error = %err, "Artwork upload rejected");
            } else {
                error!(user_id = %auth.user_id(), error = %err, "Artwork upload failed");
            }
            error_response(&err)
        }
    }
}

/// GET /upload/logs and /user/uploads - The caller's uploads, newest first.
async fn list_uploads(State(state): State<AppState>, auth: AuthUser) -> Response {
    match state.uploads.list_uploads(auth.user_id()).await {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(e) => {
            error!(user_id = %auth.user_id(), error = %e, "Failed to list uploads");
            error_response(&from_upload_error(e))
        }
    }
}
