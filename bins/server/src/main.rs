//! Atelier API Server
//!
//! Main entry point for the Atelier backend service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use atelier_api::{AppState, create_router};
use atelier_core::generation::HttpImageGenerator;
use atelier_core::storage::{StorageConfig, StorageProvider, StorageService};
use atelier_core::upload::UploadService;
use atelier_db::{UploadRepository, connect};
use atelier_shared::config::StorageSettings;
use atelier_shared::{AppConfig, JwtConfig, JwtService};

/// Builds the storage configuration; a non-blank `local_root` selects the filesystem.
fn storage_config(settings: &StorageSettings) -> StorageConfig {
    let provider = match settings.filesystem_root() {
        Some(root) => StorageProvider::local_fs(root),
        None => {
            let s3 = StorageProvider::s3(
                &settings.bucket,
                &settings.region,
                &settings.access_key_id,
                &settings.secret_access_key,
            );
            match &settings.endpoint {
                Some(endpoint) => s3.with_endpoint(endpoint),
                None => s3,
            }
        }
    };

    let config = StorageConfig::new(provider);
    match &settings.public_base_url {
        Some(base) => config.with_public_base_url(base),
        None => config,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "atelier=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;

    let db = connect(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await
    .context("failed to connect to database")?;
    info!("Connected to database");

    let jwt_service = JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        token_expires_secs: i64::try_from(config.jwt.token_expiry_secs).unwrap_or(i64::MAX),
    });

    let storage = StorageService::from_config(storage_config(&config.storage))
        .context("failed to initialize object storage")?;
    info!(
        provider = storage.provider_name(),
        bucket = %config.storage.bucket,
        region = %config.storage.region,
        "Object storage configured"
    );

    let generation_timeout = Duration::from_secs(config.generation.timeout_secs);
    let generator = HttpImageGenerator::new(config.generation.url.clone(), generation_timeout)
        .context("failed to build generation client")?;
    if !generator.is_enabled() {
        warn!("No generation endpoint configured, new owners get the fallback base image");
    }

    let uploads = UploadService::new(
        Arc::new(UploadRepository::new(db.clone())),
        Arc::new(storage),
        Arc::new(generator),
        config.generation.fallback_base_image_url.clone(),
        generation_timeout,
    );

    tokio::fs::create_dir_all(&config.uploads.temp_dir)
        .await
        .with_context(|| format!("failed to create {}", config.uploads.temp_dir))?;

    let state = AppState {
        db: Arc::new(db),
        jwt_service: Arc::new(jwt_service),
        uploads: Arc::new(uploads),
        upload_settings: Arc::new(config.uploads.clone()),
        started_at: Instant::now(),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM signal handler");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        () = ctrl_c => "Ctrl+C",
        () = terminate => "SIGTERM",
    };

    info!(signal, "Shutdown signal received, starting graceful shutdown");
}
