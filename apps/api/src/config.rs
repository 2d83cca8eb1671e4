use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Where resume PDFs and preview images are read from.
#[derive(Debug, Clone)]
pub enum BlobBackend {
    S3 {
        bucket: String,
        endpoint: String,
        access_key_id: String,
        secret_access_key: String,
    },
    Filesystem {
        root: PathBuf,
    },
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub blob_backend: BlobBackend,
    pub port: u16,
    pub rust_log: String,
    pub session_cookie: String,
    pub storage_check_interval: Duration,
    /// Pages untouched for this long are unmounted and their assets released.
    pub page_idle_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let blob_backend = match std::env::var("BLOB_DIR") {
            Ok(dir) if !dir.trim().is_empty() => BlobBackend::Filesystem {
                root: PathBuf::from(dir),
            },
            _ => BlobBackend::S3 {
                bucket: require_env("S3_BUCKET")?,
                endpoint: require_env("S3_ENDPOINT")?,
                access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            },
        };

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            blob_backend,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            session_cookie: std::env::var("SESSION_COOKIE")
                .unwrap_or_else(|_| "session".to_string()),
            storage_check_interval: Duration::from_secs(
                std::env::var("STORAGE_CHECK_INTERVAL_SECS")
                    .unwrap_or_else(|_| "2".to_string())
                    .parse::<u64>()
                    .context("STORAGE_CHECK_INTERVAL_SECS must be a whole number of seconds")?,
            ),
            page_idle_timeout: Duration::from_secs(
                std::env::var("PAGE_IDLE_SECS")
                    .unwrap_or_else(|_| "900".to_string())
                    .parse::<u64>()
                    .context("PAGE_IDLE_SECS must be a whole number of seconds")?,
            ),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
