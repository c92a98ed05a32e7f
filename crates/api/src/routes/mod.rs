//! API route definitions.

use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    middleware,
    response::IntoResponse,
};
use serde_json::json;

use crate::{AppState, middleware::auth::auth_middleware};

pub mod auth;
pub mod health;
pub mod uploads;

/// Creates the `/api` router; upload routes sit behind bearer auth.
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let max_file_size = state.upload_settings.max_file_size;
    let protected_routes = uploads::routes(max_file_size)
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(auth::routes()).merge(protected_routes)
}

/// JSON 404 for unknown routes.
pub async fn not_found(uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("Route {} not found", uri.path())
        })),
    )
}
