//! Repository for artist, photo, filmography and export operations.
//!
//! Every mutation is a whole-document read-modify-write against the bucket.
//! Concurrent writers to the same document race and the last write wins.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::{Map, Value};

use super::{keys, Bucket};
use crate::errors::AppError;
use crate::models::{
    Artist, ArtistDetails, ArtistExport, CreateArtistRequest, Filmography, Photo, PhotoMetadata,
    PhotoUpload, UploadedPhoto,
};

/// Repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    bucket: Bucket,
}

impl Repository {
    pub fn new(bucket: Bucket) -> Self {
        Self { bucket }
    }

    /// Read the artist collection. A missing document is an empty collection.
    async fn load_artists(&self) -> Result<Vec<Artist>, AppError> {
        let artists: Option<Vec<Artist>> = self.bucket.read_json(keys::ARTISTS).await?;
        Ok(artists
            .unwrap_or_default()
            .into_iter()
            .map(Artist::normalized)
            .collect())
    }

    /// Overwrite the artist collection.
    async fn save_artists(&self, artists: &[Artist]) -> Result<(), AppError> {
        self.bucket.write_json(keys::ARTISTS, artists).await
    }

    /// URL of the artist's main photo, if one exists. Lookup failures are logged
    /// and treated as "no main photo".
    pub async fn main_photo_url(&self, artist_id: &str) -> Option<String> {
        match self
            .bucket
            .list_keys(&keys::main_photo_prefix(artist_id))
            .await
        {
            Ok(found) => found.first().map(|key| self.bucket.object_url(key)),
            Err(e) => {
                tracing::warn!("Failed to resolve main photo of {}: {}", artist_id, e);
                None
            }
        }
    }

    /// Stored filmography of an artist for read-only enrichment. An unreadable
    /// document is logged and treated as absent.
    async fn stored_filmography(&self, artist_id: &str) -> Option<Filmography> {
        self.bucket
            .read_json_lenient(&keys::filmography(artist_id))
            .await
    }

    async fn photo_metadata(&self, artist_id: &str) -> PhotoMetadata {
        self.bucket
            .read_json_lenient(&keys::photo_metadata(artist_id))
            .await
            .unwrap_or_default()
    }

    async fn save_photo_metadata(
        &self,
        artist_id: &str,
        main_photo_id: Option<String>,
    ) -> Result<(), AppError> {
        let metadata = PhotoMetadata {
            main_photo_id,
            updated_at: Some(Utc::now()),
        };
        self.bucket
            .write_json(&keys::photo_metadata(artist_id), &metadata)
            .await
    }

    // ==================== ARTIST OPERATIONS ====================

    /// List all artists in insertion order, each with its main photo URL.
    pub async fn list_artists(&self) -> Result<Vec<ArtistDetails>, AppError> {
        let artists = self.load_artists().await?;

        let mut listed = Vec::with_capacity(artists.len());
        for artist in artists {
            let main_photo = self.main_photo_url(&artist.id).await;
            listed.push(ArtistDetails {
                artist,
                filmography: None,
                main_photo,
            });
        }
        Ok(listed)
    }

    /// Get an artist by ID with filmography and main photo merged in.
    pub async fn get_artist(&self, id: &str) -> Result<Option<ArtistDetails>, AppError> {
        let Some(artist) = self.load_artists().await?.into_iter().find(|a| a.id == id) else {
            return Ok(None);
        };

        let filmography = self.stored_filmography(id).await;
        let main_photo = self.main_photo_url(id).await;

        Ok(Some(ArtistDetails {
            artist,
            filmography,
            main_photo,
        }))
    }

    /// Append a new artist to the collection.
    pub async fn create_artist(
        &self,
        request: CreateArtistRequest,
    ) -> Result<ArtistDetails, AppError> {
        let name = request
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| AppError::Validation("name is required".to_string()))?;

        let artist = Artist::new(name, request.extra);

        let mut artists = self.load_artists().await?;
        artists.push(artist.clone());
        self.save_artists(&artists).await?;

        if let Some(filmography) = &request.filmography {
            self.bucket
                .write_json(&keys::filmography(&artist.id), filmography)
                .await?;
        }

        tracing::info!("Created artist {} ({})", artist.id, artist.name);
        Ok(ArtistDetails {
            artist,
            filmography: request.filmography,
            main_photo: None,
        })
    }

    /// Shallow-merge `fields` over an existing artist.
    ///
    /// A `filmography` field overwrites the artist's filmography document.
    pub async fn update_artist(
        &self,
        id: &str,
        mut fields: Map<String, Value>,
    ) -> Result<ArtistDetails, AppError> {
        let filmography = match fields.remove("filmography") {
            Some(Value::Null) | None => None,
            Some(value) => Some(serde_json::from_value::<Filmography>(value).map_err(|e| {
                AppError::BadRequest(format!("Invalid filmography: {}", e))
            })?),
        };

        let mut artists = self.load_artists().await?;
        let index = artists
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Artist {} not found", id)))?;

        artists[index].merge(fields)?;
        self.save_artists(&artists).await?;

        if let Some(filmography) = &filmography {
            self.bucket
                .write_json(&keys::filmography(id), filmography)
                .await?;
        }

        let artist = artists.swap_remove(index);
        Ok(ArtistDetails {
            artist,
            filmography,
            main_photo: self.main_photo_url(id).await,
        })
    }

    /// Remove an artist and, best effort, everything stored for it.
    pub async fn delete_artist(&self, id: &str) -> Result<(), AppError> {
        let mut artists = self.load_artists().await?;
        let before = artists.len();
        artists.retain(|a| a.id != id);
        if artists.len() == before {
            return Err(AppError::NotFound(format!("Artist {} not found", id)));
        }
        self.save_artists(&artists).await?;

        for key in [keys::filmography(id), keys::photo_metadata(id)] {
            if let Err(e) = self.bucket.delete(&key).await {
                tracing::warn!("Failed to delete {} for artist {}: {}", key, id, e);
            }
        }
        match self.bucket.delete_prefix(&keys::artist_prefix(id)).await {
            Ok(count) => tracing::debug!("Deleted {} objects of artist {}", count, id),
            Err(e) => tracing::warn!("Failed to delete photos of artist {}: {}", id, e),
        }

        tracing::info!("Deleted artist {}", id);
        Ok(())
    }

    // ==================== PHOTO OPERATIONS ====================

    /// List uploaded photos of an artist.
    pub async fn list_photos(&self, artist_id: &str) -> Result<Vec<Photo>, AppError> {
        let photo_keys = self
            .bucket
            .list_keys(&keys::photos_prefix(artist_id))
            .await?;
        let metadata = self.photo_metadata(artist_id).await;

        Ok(photo_keys
            .into_iter()
            .map(|key| {
                let id = keys::photo_id_from_key(&key).to_string();
                Photo {
                    is_main: metadata.main_photo_id.as_deref() == Some(id.as_str()),
                    url: self.bucket.object_url(&key),
                    id,
                    key,
                }
            })
            .collect())
    }

    /// Store an uploaded photo under a freshly generated photo id.
    pub async fn upload_photo(
        &self,
        artist_id: &str,
        upload: PhotoUpload,
    ) -> Result<UploadedPhoto, AppError> {
        let photo_id = uuid::Uuid::new_v4().simple().to_string();
        let extension = upload
            .file_name
            .as_deref()
            .and_then(keys::extension_of)
            .unwrap_or_else(|| keys::DEFAULT_PHOTO_EXTENSION.to_string());
        let content_type = upload
            .content_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| keys::content_type_for(&extension).to_string());

        let key = keys::photo(artist_id, &photo_id, &extension);
        self.bucket
            .put_object(&key, upload.body, &content_type)
            .await?;

        tracing::info!("Stored photo {} for artist {}", key, artist_id);
        Ok(UploadedPhoto {
            url: self.bucket.object_url(&key),
            photo_id,
            key,
        })
    }

    /// Delete every stored variant of a photo. Returns how many objects were removed.
    pub async fn delete_photo(&self, artist_id: &str, photo_id: &str) -> Result<usize, AppError> {
        let matches = self
            .bucket
            .list_keys(&keys::photo_prefix(artist_id, photo_id))
            .await?;
        if matches.is_empty() {
            return Err(AppError::NotFound(format!("Photo {} not found", photo_id)));
        }

        for key in &matches {
            self.bucket.delete(key).await?;
        }

        let metadata = self.photo_metadata(artist_id).await;
        if metadata.main_photo_id.as_deref() == Some(photo_id) {
            self.save_photo_metadata(artist_id, None).await?;
        }

        Ok(matches.len())
    }

    /// Copy a photo to the artist's main photo key, keeping its extension and content type.
    pub async fn set_main_photo(&self, artist_id: &str, photo_id: &str) -> Result<String, AppError> {
        let not_found = || AppError::NotFound(format!("Photo {} not found", photo_id));

        let source_key = self
            .bucket
            .list_keys(&keys::photo_prefix(artist_id, photo_id))
            .await?
            .into_iter()
            .next()
            .ok_or_else(not_found)?;
        let source = self
            .bucket
            .get_object(&source_key)
            .await?
            .ok_or_else(not_found)?;

        let extension = keys::extension_of(&source_key)
            .unwrap_or_else(|| keys::DEFAULT_PHOTO_EXTENSION.to_string());
        let main_key = keys::main_photo(artist_id, &extension);

        // A previous main photo may have a different extension.
        for stale in self
            .bucket
            .list_keys(&keys::main_photo_prefix(artist_id))
            .await?
        {
            if stale != main_key {
                self.bucket.delete(&stale).await?;
            }
        }

        self.bucket
            .put_object(&main_key, source.body, &source.content_type)
            .await?;
        self.save_photo_metadata(artist_id, Some(photo_id.to_string()))
            .await?;

        tracing::info!("Set main photo of {} from {}", artist_id, source_key);
        Ok(self.bucket.object_url(&main_key))
    }

    // ==================== FILMOGRAPHY OPERATIONS ====================

    /// Get an artist's filmography, or the empty default if none is stored.
    pub async fn get_filmography(&self, artist_id: &str) -> Result<Filmography, AppError> {
        Ok(self
            .bucket
            .read_json(&keys::filmography(artist_id))
            .await?
            .unwrap_or_default())
    }

    /// Overwrite an artist's filmography document.
    pub async fn put_filmography(
        &self,
        artist_id: &str,
        filmography: &Filmography,
    ) -> Result<(), AppError> {
        self.bucket
            .write_json(&keys::filmography(artist_id), filmography)
            .await
    }

    // ==================== EXPORT OPERATIONS ====================

    /// Display documents for every artist, keyed by artist name.
    ///
    /// Artists sharing a name collide; the later one in the collection wins.
    pub async fn export_artists(&self) -> Result<BTreeMap<String, ArtistExport>, AppError> {
        let artists = self.load_artists().await?;

        let mut exported = BTreeMap::new();
        for artist in artists {
            let filmography = self
                .stored_filmography(&artist.id)
                .await
                .unwrap_or_default();
            let main_photo = self.main_photo_url(&artist.id).await;
            let entry = ArtistExport {
                title: ArtistExport::title_for(&artist.name),
                id: artist.id,
                name: artist.name.clone(),
                filmography,
                main_photo,
            };
            if let Some(previous) = exported.insert(artist.name, entry) {
                tracing::warn!(
                    "Export name collision: artist {} replaced by a later artist with the same name",
                    previous.id
                );
            }
        }
        Ok(exported)
    }

    /// Stored filmographies keyed by artist name; artists without a readable one are omitted.
    pub async fn export_filmography(&self) -> Result<BTreeMap<String, Filmography>, AppError> {
        let artists = self.load_artists().await?;

        let mut exported = BTreeMap::new();
        for artist in artists {
            if let Some(filmography) = self.stored_filmography(&artist.id).await {
                if exported.insert(artist.name, filmography).is_some() {
                    tracing::warn!("Export name collision on artist {}", artist.id);
                }
            }
        }
        Ok(exported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::OperatorStore;
    use bytes::Bytes;
    use serde_json::json;
    use std::sync::Arc;

    fn repository() -> Repository {
        Repository::new(Bucket::new(
            Arc::new(OperatorStore::memory().unwrap()),
            "https://cdn.test",
        ))
    }

    fn create_request(value: Value) -> CreateArtistRequest {
        serde_json::from_value(value).unwrap()
    }

    fn upload(name: Option<&str>, body: &'static [u8]) -> PhotoUpload {
        PhotoUpload {
            file_name: name.map(String::from),
            content_type: None,
            body: Bytes::from_static(body),
        }
    }

    #[tokio::test]
    async fn test_create_preserves_insertion_order() {
        let repo = repository();
        for name in ["Kim", "Lee", "Park"] {
            repo.create_artist(create_request(json!({ "name": name })))
                .await
                .unwrap();
        }

        let names: Vec<String> = repo
            .list_artists()
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.artist.name)
            .collect();
        assert_eq!(names, vec!["Kim", "Lee", "Park"]);
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let repo = repository();
        let err = repo
            .create_artist(create_request(json!({ "agency": "North" })))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(repo.list_artists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_artist_leaves_collection_untouched() {
        let repo = repository();
        let created = repo
            .create_artist(create_request(json!({ "name": "Kim" })))
            .await
            .unwrap();
        let before = repo.bucket.read_text(keys::ARTISTS).await;

        let err = repo
            .update_artist("missing", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(repo.bucket.read_text(keys::ARTISTS).await, before);
        assert!(repo.get_artist(&created.artist.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_writes_filmography_document() {
        let repo = repository();
        let created = repo
            .create_artist(create_request(json!({ "name": "Kim" })))
            .await
            .unwrap();
        let id = created.artist.id;

        let fields = match json!({ "filmography": { "movies": [{"title": "M"}] } }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        repo.update_artist(&id, fields).await.unwrap();

        let filmography = repo.get_filmography(&id).await.unwrap();
        assert_eq!(filmography.movies, vec![json!({"title": "M"})]);
        assert!(filmography.dramas.is_empty());

        let stored = repo.bucket.read_text(keys::ARTISTS).await.unwrap();
        assert!(!stored.contains("filmography"));
    }

    #[tokio::test]
    async fn test_delete_cleans_up_artist_objects() {
        let repo = repository();
        let id = repo
            .create_artist(create_request(json!({
                "name": "Kim",
                "filmography": { "dramas": [{"title": "A"}] }
            })))
            .await
            .unwrap()
            .artist
            .id;
        for i in 0..3 {
            let name = format!("shot{}.png", i);
            repo.upload_photo(
                &id,
                PhotoUpload {
                    file_name: Some(name),
                    content_type: None,
                    body: Bytes::from_static(b"png"),
                },
            )
            .await
            .unwrap();
        }

        repo.delete_artist(&id).await.unwrap();

        assert!(repo.get_artist(&id).await.unwrap().is_none());
        assert!(repo.bucket.read_text(&keys::filmography(&id)).await.is_none());
        assert!(repo
            .bucket
            .list_keys(&keys::artist_prefix(&id))
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            repo.delete_artist(&id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_upload_defaults_extension_and_content_type() {
        let repo = repository();
        let uploaded = repo
            .upload_photo("a1", upload(None, b"jpeg-bytes"))
            .await
            .unwrap();
        assert!(uploaded.key.ends_with(".jpg"));
        assert_eq!(uploaded.url, format!("https://cdn.test/{}", uploaded.key));

        let object = repo
            .bucket
            .get_object(&uploaded.key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(object.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_main_photo_keeps_source_format_and_is_flagged() {
        let repo = repository();
        let first = repo
            .upload_photo("a1", upload(Some("one.jpg"), b"first"))
            .await
            .unwrap();
        let second = repo
            .upload_photo("a1", upload(Some("two.PNG"), b"second"))
            .await
            .unwrap();

        repo.set_main_photo("a1", &first.photo_id).await.unwrap();
        let url = repo.set_main_photo("a1", &second.photo_id).await.unwrap();
        assert_eq!(url, "https://cdn.test/artists/a1/main.png");

        // The previous .jpg main copy is gone
        let mains = repo
            .bucket
            .list_keys(&keys::main_photo_prefix("a1"))
            .await
            .unwrap();
        assert_eq!(mains, vec!["artists/a1/main.png".to_string()]);

        let main = repo
            .bucket
            .get_object("artists/a1/main.png")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(main.body, Bytes::from_static(b"second"));
        assert_eq!(main.content_type, "image/png");

        let photos = repo.list_photos("a1").await.unwrap();
        assert_eq!(photos.len(), 2);
        for photo in photos {
            assert_eq!(photo.is_main, photo.id == second.photo_id);
        }
    }

    #[tokio::test]
    async fn test_set_main_photo_unknown_id() {
        let repo = repository();
        let err = repo.set_main_photo("a1", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_photo_clears_main_flag() {
        let repo = repository();
        let photo = repo
            .upload_photo("a1", upload(Some("one.webp"), b"x"))
            .await
            .unwrap();
        repo.set_main_photo("a1", &photo.photo_id).await.unwrap();

        assert_eq!(repo.delete_photo("a1", &photo.photo_id).await.unwrap(), 1);
        assert!(repo.list_photos("a1").await.unwrap().is_empty());
        assert!(repo.photo_metadata("a1").await.main_photo_id.is_none());
        assert!(matches!(
            repo.delete_photo("a1", &photo.photo_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_exports_key_by_name() {
        let repo = repository();
        let kim = repo
            .create_artist(create_request(json!({
                "name": "Kim",
                "filmography": { "dramas": [{"title": "A"}] }
            })))
            .await
            .unwrap();
        repo.create_artist(create_request(json!({ "name": "Lee" })))
            .await
            .unwrap();

        let artists = repo.export_artists().await.unwrap();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists["Kim"].id, kim.artist.id);
        assert_eq!(artists["Kim"].title, "Kim | Filmography");
        assert_eq!(artists["Lee"].filmography, Filmography::default());

        let filmography = repo.export_filmography().await.unwrap();
        assert_eq!(filmography.len(), 1);
        assert_eq!(filmography["Kim"].dramas, vec![json!({"title": "A"})]);
    }

    #[tokio::test]
    async fn test_corrupt_filmography_is_skipped_by_every_reader() {
        let repo = repository();
        let kim = repo
            .create_artist(create_request(json!({ "name": "Kim" })))
            .await
            .unwrap()
            .artist
            .id;
        repo.create_artist(create_request(json!({
            "name": "Lee",
            "filmography": { "movies": [{"title": "M"}] }
        })))
        .await
        .unwrap();
        repo.bucket
            .put_object(
                &keys::filmography(&kim),
                Bytes::from_static(b"{broken"),
                "application/json",
            )
            .await
            .unwrap();

        let details = repo.get_artist(&kim).await.unwrap().unwrap();
        assert!(details.filmography.is_none());

        let artists = repo.export_artists().await.unwrap();
        assert_eq!(artists["Kim"].filmography, Filmography::default());
        assert_eq!(artists["Lee"].filmography.movies, vec![json!({"title": "M"})]);

        let filmography = repo.export_filmography().await.unwrap();
        assert_eq!(filmography.len(), 1);
        assert!(filmography.contains_key("Lee"));
    }
}
