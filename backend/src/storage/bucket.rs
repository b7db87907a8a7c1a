//! Thin helpers over the object store.

use std::sync::Arc;

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use super::{ObjectStore, StoredObject};
use crate::errors::AppError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Handle to the bucket plus the base URL objects are published under.
#[derive(Clone)]
pub struct Bucket {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl Bucket {
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Read an object as UTF-8 text. Missing objects and failures both yield `None`;
    /// failures are logged.
    pub async fn read_text(&self, key: &str) -> Option<String> {
        match self.try_read_text(key).await {
            Ok(text) => text,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", key, e);
                None
            }
        }
    }

    /// Read an object as UTF-8 text, propagating storage failures.
    pub async fn try_read_text(&self, key: &str) -> Result<Option<String>, AppError> {
        let Some(object) = self.store.get(key).await? else {
            return Ok(None);
        };
        String::from_utf8(object.body.to_vec())
            .map(Some)
            .map_err(|e| AppError::Storage(format!("Object {} is not UTF-8: {}", key, e)))
    }

    /// Read and parse a JSON document, propagating storage and parse failures.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        match self.try_read_text(key).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Read and parse a JSON document; any failure is logged and treated as absent.
    pub async fn read_json_lenient<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.read_text(key).await?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!("Failed to parse {}: {}", key, e);
                None
            }
        }
    }

    /// Serialize `value` and store it with a JSON content type.
    pub async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let body = serde_json::to_vec_pretty(value)?;
        self.store
            .put(key, Bytes::from(body), JSON_CONTENT_TYPE)
            .await
    }

    pub async fn get_object(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        self.store.get(key).await
    }

    pub async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        self.store.put(key, body, content_type).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.store.delete(key).await
    }

    /// Every key under `prefix`, across all listing pages.
    pub async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        self.store.list(prefix).await
    }

    /// Delete every object under `prefix`, returning how many were removed.
    pub async fn delete_prefix(&self, prefix: &str) -> Result<usize, AppError> {
        let keys = self.list_keys(prefix).await?;
        for key in &keys {
            self.store.delete(key).await?;
        }
        Ok(keys.len())
    }

    /// Public URL of an object.
    ///
    /// Placeholder `{base}/{key}` form; no signing is performed.
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_base_url, key)
    }
}
