//! Photo API endpoints.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::{ApiResponse, ApiResult};
use crate::errors::AppError;
use crate::models::{Photo, PhotoUpload, UploadedPhoto};
use crate::storage::keys;
use crate::AppState;

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPhoto {
    pub photo_id: String,
    pub deleted: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainPhotoSet {
    pub photo_id: String,
    pub main_photo: String,
}

/// GET /api/artists/{id}/photos - List an artist's photos.
pub async fn list_photos(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> ApiResult<Json<Vec<Photo>>> {
    let artist_id = keys::validate_id("artist", &artist_id)?;

    Ok(Json(state.repo.list_photos(artist_id).await?))
}

/// POST /api/artists/{id}/photos - Upload a photo (multipart field `file`).
pub async fn upload_photo(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, ApiResponse<UploadedPhoto>)> {
    let artist_id = keys::validate_id("artist", &artist_id)?;

    let upload = read_file_field(multipart?)
        .await?
        .ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;

    let uploaded = state.repo.upload_photo(artist_id, upload).await?;
    Ok(ApiResponse::new(uploaded).created())
}

/// DELETE /api/artists/{id}/photos/{photoId} - Delete a photo.
pub async fn delete_photo(
    State(state): State<AppState>,
    Path((artist_id, photo_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<DeletedPhoto>> {
    let artist_id = keys::validate_id("artist", &artist_id)?;
    let photo_id = keys::validate_id("photo", &photo_id)?;

    let deleted = state.repo.delete_photo(artist_id, photo_id).await?;
    Ok(ApiResponse::new(DeletedPhoto {
        photo_id: photo_id.to_string(),
        deleted,
    }))
}

/// PUT /api/artists/{id}/photos/{photoId}/main - Make a photo the main photo.
pub async fn set_main_photo(
    State(state): State<AppState>,
    Path((artist_id, photo_id)): Path<(String, String)>,
) -> ApiResult<ApiResponse<MainPhotoSet>> {
    let artist_id = keys::validate_id("artist", &artist_id)?;
    let photo_id = keys::validate_id("photo", &photo_id)?;

    let main_photo = state.repo.set_main_photo(artist_id, photo_id).await?;
    Ok(ApiResponse::new(MainPhotoSet {
        photo_id: photo_id.to_string(),
        main_photo,
    }))
}

/// Pull the first non-empty `file` field out of a multipart body.
async fn read_file_field(mut multipart: Multipart) -> Result<Option<PhotoUpload>, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field.bytes().await?;
        if body.is_empty() {
            continue;
        }

        return Ok(Some(PhotoUpload {
            file_name,
            content_type,
            body,
        }));
    }

    Ok(None)
}
