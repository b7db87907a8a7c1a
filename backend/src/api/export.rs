//! Public export endpoints for the agency website.

use std::collections::BTreeMap;

use axum::{extract::State, Json};

use super::ApiResult;
use crate::models::{ArtistExport, Filmography};
use crate::AppState;

/// GET /api/export/artists - Display documents keyed by artist name.
pub async fn export_artists(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, ArtistExport>>> {
    Ok(Json(state.repo.export_artists().await?))
}

/// GET /api/export/filmography - Stored filmographies keyed by artist name.
pub async fn export_filmography(
    State(state): State<AppState>,
) -> ApiResult<Json<BTreeMap<String, Filmography>>> {
    Ok(Json(state.repo.export_filmography().await?))
}
