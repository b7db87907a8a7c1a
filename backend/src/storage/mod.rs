//! Object storage module.
//!
//! The bucket is the only persistence layer: every artist, filmography and photo
//! lives as an object addressed by a path-like key. Application code goes through
//! [`Bucket`] and [`Repository`], never through a backend directly.

mod bucket;
pub mod keys;
mod operator;
mod repository;

pub use bucket::*;
pub use operator::OperatorStore;
pub use repository::*;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{Config, StorageBackend};
use crate::errors::AppError;

/// An object read back from the bucket.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// The storage interface consumed by the service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object. Returns `Ok(None)` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError>;

    /// Write an object, overwriting any existing one.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError>;

    /// Delete an object. Does not error if the key does not exist.
    async fn delete(&self, key: &str) -> Result<(), AppError>;

    /// Every key starting with `prefix`, in lexicographic order.
    ///
    /// Implementations must follow the service's listing pages to the end.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError>;
}

/// Open the storage backend selected by the configuration.
pub async fn init_storage(config: &Config) -> Result<Arc<dyn ObjectStore>, AppError> {
    let store = match config.storage_backend {
        StorageBackend::Local => OperatorStore::fs(&config.storage_path).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on restart");
            OperatorStore::memory()?
        }
        StorageBackend::S3 => OperatorStore::s3(&config.s3)?,
    };
    Ok(Arc::new(store))
}
