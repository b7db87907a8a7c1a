//! Filmography API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{ApiResult, JsonBody};
use crate::models::Filmography;
use crate::storage::keys;
use crate::AppState;

/// GET /api/artists/{id}/filmography - Get an artist's filmography.
pub async fn get_filmography(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
) -> ApiResult<Json<Filmography>> {
    let artist_id = keys::validate_id("artist", &artist_id)?;

    Ok(Json(state.repo.get_filmography(artist_id).await?))
}

/// PUT /api/artists/{id}/filmography - Replace an artist's filmography.
pub async fn update_filmography(
    State(state): State<AppState>,
    Path(artist_id): Path<String>,
    JsonBody(filmography): JsonBody<Filmography>,
) -> ApiResult<Json<Filmography>> {
    let artist_id = keys::validate_id("artist", &artist_id)?;

    state.repo.put_filmography(artist_id, &filmography).await?;
    Ok(Json(filmography))
}
