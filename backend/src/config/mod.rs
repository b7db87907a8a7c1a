//! Configuration module for the artist backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

/// Default upload limit (10 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Which object storage backend to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Filesystem-backed bucket rooted at `storage_path`
    Local,
    /// Volatile in-process bucket (development and tests)
    Memory,
    /// S3-compatible bucket described by [`S3Config`]
    S3,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "fs" => Ok(StorageBackend::Local),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            "s3" => Ok(StorageBackend::S3),
            other => Err(format!("unknown storage backend {:?}", other)),
        }
    }
}

/// Connection settings for an S3-compatible bucket.
///
/// Credentials are not configured here; they come from the standard
/// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY` environment.
#[derive(Debug, Clone, Default)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for non-AWS providers
    pub endpoint: Option<String>,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Object storage backend
    pub storage_backend: StorageBackend,
    /// Root directory of the local bucket
    pub storage_path: PathBuf,
    /// Settings used when `storage_backend` is S3
    pub s3: S3Config,
    /// Base URL prepended to object keys when building photo URLs
    pub public_base_url: String,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("ARTIST_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid ARTIST_BIND_ADDR format");

        let storage_backend = env::var("ARTIST_STORAGE_BACKEND")
            .ok()
            .map(|v| v.parse().expect("Invalid ARTIST_STORAGE_BACKEND value"))
            .unwrap_or(StorageBackend::Local);

        let storage_path = env::var("ARTIST_STORAGE_PATH")
            .unwrap_or_else(|_| "./data/bucket".to_string())
            .into();

        let s3 = S3Config {
            bucket: env::var("ARTIST_S3_BUCKET").unwrap_or_default(),
            region: env::var("ARTIST_S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
            endpoint: env::var("ARTIST_S3_ENDPOINT").ok().filter(|v| !v.is_empty()),
        };

        let public_base_url = env::var("ARTIST_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "https://storage.example.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes = env::var("ARTIST_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let log_level = env::var("ARTIST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("ARTIST_LOG_FORMAT")
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        Self {
            bind_addr,
            storage_backend,
            storage_path,
            s3,
            public_base_url,
            max_upload_bytes,
            log_level,
            log_json,
        }
    }
}
