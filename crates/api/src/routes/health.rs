//! Health check endpoints.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::AppState;

/// Root endpoint response.
#[derive(Serialize)]
pub struct RootResponse {
    /// Greeting.
    pub message: &'static str,
    /// Service status.
    pub status: &'static str,
    /// Seconds since start.
    pub uptime_secs: u64,
    /// Current time (RFC 3339).
    pub timestamp: String,
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Seconds since start.
    pub uptime_secs: u64,
    /// Current time (RFC 3339).
    pub timestamp: String,
}

async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Atelier API is running",
        status: "healthy",
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}
