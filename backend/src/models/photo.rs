//! Photo models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored photo of an artist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub key: String,
    pub url: String,
    pub is_main: bool,
}

/// Result of a successful upload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedPhoto {
    pub photo_id: String,
    pub key: String,
    pub url: String,
}

/// Per-artist photo bookkeeping, stored next to the filmography documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    /// Photo the current main photo was copied from
    #[serde(default)]
    pub main_photo_id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A file received in an upload request.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub body: bytes::Bytes,
}
