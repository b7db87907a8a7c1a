//! Artist API endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{ApiResponse, ApiResult, JsonBody};
use crate::errors::AppError;
use crate::models::{ArtistDetails, CreateArtistRequest};
use crate::storage::keys;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedArtist {
    pub artist_id: String,
    pub artist: ArtistDetails,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedArtist {
    pub artist_id: String,
}

/// GET /api/artists - List all artists.
pub async fn list_artists(State(state): State<AppState>) -> ApiResult<Json<Vec<ArtistDetails>>> {
    Ok(Json(state.repo.list_artists().await?))
}

/// GET /api/artists/{id} - Get a single artist.
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ArtistDetails>> {
    let id = keys::validate_id("artist", &id)?;

    match state.repo.get_artist(id).await? {
        Some(artist) => Ok(Json(artist)),
        None => Err(AppError::NotFound(format!("Artist {} not found", id))),
    }
}

/// POST /api/artists - Create a new artist.
pub async fn create_artist(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateArtistRequest>,
) -> ApiResult<(StatusCode, ApiResponse<CreatedArtist>)> {
    let artist = state.repo.create_artist(request).await?;

    Ok(ApiResponse::new(CreatedArtist {
        artist_id: artist.artist.id.clone(),
        artist,
    })
    .created())
}

/// PUT /api/artists/{id} - Update an artist.
pub async fn update_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(fields): JsonBody<Map<String, Value>>,
) -> ApiResult<Json<ArtistDetails>> {
    let id = keys::validate_id("artist", &id)?;

    Ok(Json(state.repo.update_artist(id, fields).await?))
}

/// DELETE /api/artists/{id} - Delete an artist and its photos and filmography.
pub async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<DeletedArtist>> {
    let id = keys::validate_id("artist", &id)?;

    state.repo.delete_artist(id).await?;
    Ok(ApiResponse::new(DeletedArtist {
        artist_id: id.to_string(),
    }))
}
