mod config;
mod errors;
mod models;
mod render;
mod review;
mod routes;
mod session;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{BlobBackend, Config};
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::fs::FsBlobStore;
use crate::storage::redis_kv::RedisKvStore;
use crate::storage::s3::{S3BlobStore, S3Settings};
use crate::storage::{BlobStore, Storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume review v{}", env!("CARGO_PKG_VERSION"));

    // Key-value store: resume records and session markers
    let kv = Arc::new(RedisKvStore::open(&config.redis_url)?);
    info!("Redis client initialized");

    // Blob store: PDFs and preview images
    let blobs = build_blob_store(&config).await;

    let storage = Storage::new(kv, blobs);

    // Pages render their loading state until both stores answer
    tokio::spawn(
        storage
            .clone()
            .wait_until_ready(config.storage_check_interval),
    );

    let state = AppState::new(storage, config.session_cookie.clone());

    // Abandoned pages are unmounted once idle; sweep a few times per timeout
    let sweep_every = (config.page_idle_timeout / 4).max(Duration::from_secs(1));
    tokio::spawn(
        state
            .pages
            .clone()
            .sweep_idle(config.page_idle_timeout, sweep_every),
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the auth front-end has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_blob_store(config: &Config) -> Arc<dyn BlobStore> {
    match &config.blob_backend {
        BlobBackend::S3 {
            bucket,
            endpoint,
            access_key_id,
            secret_access_key,
        } => {
            let store = S3BlobStore::connect(S3Settings {
                bucket,
                endpoint,
                access_key_id,
                secret_access_key,
            })
            .await;
            info!("S3 client initialized (bucket: {bucket})");
            Arc::new(store)
        }
        BlobBackend::Filesystem { root } => {
            info!("Serving blobs from {}", root.display());
            Arc::new(FsBlobStore::new(root.clone()))
        }
    }
}
