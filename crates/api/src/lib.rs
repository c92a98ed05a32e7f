//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for signup, login and artwork uploads
//! - Authentication and security header middleware
//! - Mapping of domain errors to JSON error responses

pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use atelier_core::generation::HttpImageGenerator;
use atelier_core::storage::StorageService;
use atelier_core::upload::UploadService;
use atelier_db::UploadRepository;
use atelier_shared::JwtService;
use atelier_shared::config::UploadSettings;

/// Upload orchestrator wired to the production collaborators.
pub type ArtworkUploadService = UploadService<UploadRepository, StorageService, HttpImageGenerator>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token operations.
    pub jwt_service: Arc<JwtService>,
    /// Artwork upload orchestrator.
    pub uploads: Arc<ArtworkUploadService>,
    /// Inbound upload limits and staging directory.
    pub upload_settings: Arc<UploadSettings>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .nest("/api", routes::api_routes_with_state(state.clone()))
        .fallback(routes::not_found)
        .layer(axum::middleware::from_fn(
            middleware::security_headers::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
