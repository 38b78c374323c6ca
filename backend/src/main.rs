//! SkillSwap Backend Server
//!
//! HTTP API for the skill-exchange marketplace: profiles, skills, swap
//! requests, messages, reviews, verification uploads and the admin
//! moderation overlay.

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};

use skillswap_server::config::{Config, ObjectStorageBackend, StoreBackend};
use skillswap_server::db;
use skillswap_server::routes;
use skillswap_server::state::AppState;
use skillswap_server::store::{
    HttpObjectStorage, InMemoryRecordStore, LocalObjectStorage, ObjectStorage, PgRecordStore,
    RecordStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!(environment = %config.environment.as_str(), "Starting SkillSwap server");

    let store: Arc<dyn RecordStore> = match &config.store {
        StoreBackend::Postgres { database_url } => {
            tracing::info!(
                database_url = ?config.database_url_masked(),
                "Connecting to database..."
            );
            let pool = db::create_pool(database_url, config.db_max_connections).await?;
            db::run_migrations(&pool).await?;
            Arc::new(PgRecordStore::new(pool))
        }
        StoreBackend::Memory { latency } => {
            tracing::warn!(
                latency_ms = latency.as_millis() as u64,
                "Using in-memory record store; data is lost on shutdown"
            );
            Arc::new(InMemoryRecordStore::with_latency(*latency))
        }
    };

    let objects: Arc<dyn ObjectStorage> = match &config.object_storage {
        ObjectStorageBackend::Local { root } => {
            tracing::info!(root = %root.display(), "Storing uploads on local disk");
            Arc::new(LocalObjectStorage::new(root.clone()))
        }
        ObjectStorageBackend::Http { base_url, api_key } => {
            tracing::info!(base_url = %base_url, "Storing uploads in remote object storage");
            Arc::new(HttpObjectStorage::new(base_url.clone(), api_key.clone()))
        }
    };

    let app_state = AppState::new(store, objects, config.jwt_secret.clone());

    let app = routes::create_router(app_state, config.max_upload_bytes)
        .layer(configure_cors(config.cors_allowed_origins.as_deref()));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check at http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn configure_cors(allowed_origins: Option<&str>) -> CorsLayer {
    let allowed_origins = allowed_origins.unwrap_or_default();

    if allowed_origins.trim().is_empty() {
        tracing::warn!("CORS_ALLOWED_ORIGINS not set, allowing all origins (permissive)");
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}
