//! [`ObjectStore`] over an OpenDAL operator.
//!
//! The same code drives the filesystem, in-memory and S3 services; the service
//! is picked once in [`super::init_storage`].

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use opendal::{services, ErrorKind, Operator};

use super::{keys, ObjectStore, StoredObject};
use crate::config::S3Config;
use crate::errors::AppError;

/// Bucket backed by an OpenDAL [`Operator`].
#[derive(Clone)]
pub struct OperatorStore {
    op: Operator,
}

impl OperatorStore {
    pub fn new(op: Operator) -> Self {
        Self { op }
    }

    /// Volatile in-process bucket.
    pub fn memory() -> Result<Self, AppError> {
        Ok(Self::new(Operator::new(services::Memory::default())?.finish()))
    }

    /// Bucket rooted at a local directory, created if missing.
    pub async fn fs(root: &Path) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(root).await?;
        let root = tokio::fs::canonicalize(root).await?;
        let root = root
            .to_str()
            .ok_or_else(|| AppError::Internal(format!("Storage path {:?} is not UTF-8", root)))?;

        let builder = services::Fs::default().root(root);
        tracing::info!("Local bucket opened at {}", root);
        Ok(Self::new(Operator::new(builder)?.finish()))
    }

    /// S3-compatible bucket.
    pub fn s3(config: &S3Config) -> Result<Self, AppError> {
        if config.bucket.is_empty() {
            return Err(AppError::Internal(
                "ARTIST_S3_BUCKET must be set for the s3 backend".to_string(),
            ));
        }

        let mut builder = services::S3::default()
            .bucket(&config.bucket)
            .region(&config.region);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint);
        }
        tracing::info!("S3 bucket {} in {}", config.bucket, config.region);
        Ok(Self::new(Operator::new(builder)?.finish()))
    }

    /// Whether the service keeps the content type given at write time.
    fn stores_content_type(&self) -> bool {
        self.op.info().full_capability().write_with_content_type
    }
}

#[async_trait]
impl ObjectStore for OperatorStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, AppError> {
        let body = match self.op.read(key).await {
            Ok(buffer) => buffer.to_bytes(),
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let stored = if self.stores_content_type() {
            self.op
                .stat(key)
                .await?
                .content_type()
                .map(str::to_string)
        } else {
            None
        };
        // Services without object metadata fall back to the key's extension.
        let content_type = stored.unwrap_or_else(|| keys::content_type_for_key(key).to_string());

        Ok(Some(StoredObject { body, content_type }))
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), AppError> {
        if self.stores_content_type() {
            self.op
                .write_with(key, body)
                .content_type(content_type)
                .await?;
        } else {
            self.op.write(key, body).await?;
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.op.delete(key).await?;
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, AppError> {
        // Listing works on directories; list the prefix's directory and filter.
        let dir = match prefix.rfind('/') {
            Some(idx) => &prefix[..=idx],
            None => "",
        };

        let mut lister = match self.op.lister_with(dir).recursive(true).await {
            Ok(lister) => lister,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        // The lister fetches further pages from the service as it is drained.
        let mut found = Vec::new();
        while let Some(entry) = lister.try_next().await? {
            let path = entry.path();
            if !path.ends_with('/') && path.starts_with(prefix) {
                found.push(path.to_string());
            }
        }
        found.sort();
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_fs_put_get_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = OperatorStore::fs(temp_dir.path()).await.unwrap();

        store
            .put(
                "artists/a1/photos/p1.png",
                Bytes::from_static(b"png-bytes"),
                "image/png",
            )
            .await
            .unwrap();

        let object = store.get("artists/a1/photos/p1.png").await.unwrap().unwrap();
        assert_eq!(object.body, Bytes::from_static(b"png-bytes"));
        assert_eq!(object.content_type, "image/png");
        assert!(temp_dir.path().join("artists/a1/photos/p1.png").exists());

        assert!(store.get("artists/a1/photos/missing.png").await.unwrap().is_none());

        // Deleting twice is fine
        store.delete("artists/a1/photos/p1.png").await.unwrap();
        store.delete("artists/a1/photos/p1.png").await.unwrap();
        assert!(store.get("artists/a1/photos/p1.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fs_list_is_recursive_and_prefix_filtered() {
        let temp_dir = TempDir::new().unwrap();
        let store = OperatorStore::fs(temp_dir.path()).await.unwrap();

        for key in [
            "artists/a1/main.jpg",
            "artists/a1/photos/p1.jpg",
            "artists/a1/photos/p10.png",
            "artists/a1/photos/p2.jpg",
            "artists/a2/photos/p1.jpg",
        ] {
            store
                .put(key, Bytes::from_static(b"x"), "image/jpeg")
                .await
                .unwrap();
        }

        let all = store.list("artists/a1/").await.unwrap();
        assert_eq!(
            all,
            vec![
                "artists/a1/main.jpg",
                "artists/a1/photos/p1.jpg",
                "artists/a1/photos/p10.png",
                "artists/a1/photos/p2.jpg",
            ]
        );

        let photo = store.list("artists/a1/photos/p1.").await.unwrap();
        assert_eq!(photo, vec!["artists/a1/photos/p1.jpg"]);

        assert!(store.list("artists/zz/photos/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_list_many_keys() {
        let store = OperatorStore::memory().unwrap();
        for i in 0..250 {
            store
                .put(
                    &format!("artists/a/photos/{:03}.jpg", i),
                    Bytes::from_static(b"x"),
                    "image/jpeg",
                )
                .await
                .unwrap();
        }

        let listed = store.list("artists/a/photos/").await.unwrap();
        assert_eq!(listed.len(), 250);
        assert_eq!(listed[0], "artists/a/photos/000.jpg");
        assert_eq!(listed[249], "artists/a/photos/249.jpg");
    }

    #[tokio::test]
    async fn test_json_content_type_from_key() {
        let store = OperatorStore::memory().unwrap();
        store
            .put("data/artists.json", Bytes::from_static(b"[]"), "application/json")
            .await
            .unwrap();

        let object = store.get("data/artists.json").await.unwrap().unwrap();
        assert_eq!(object.content_type, "application/json");
    }
}
