//! Artist model and request bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Filmography;
use crate::errors::AppError;

/// Fields the service owns; clients cannot set them through the extra profile map.
const RESERVED_FIELDS: &[&str] = &[
    "id",
    "name",
    "createdAt",
    "updatedAt",
    "filmography",
    "mainPhoto",
];

/// An artist record as stored in the artist collection document.
///
/// Any profile fields beyond the named ones are kept verbatim in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Artist {
    /// Build a new record with a fresh id and both timestamps set to now.
    pub fn new(name: String, extra: Map<String, Value>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            created_at: now,
            updated_at: now,
            extra: without_reserved(extra),
        }
    }

    /// Shallow-merge client-supplied fields over this record and refresh `updatedAt`.
    ///
    /// `id` and `createdAt` are immutable; derived fields are ignored.
    pub fn merge(&mut self, fields: Map<String, Value>) -> Result<(), AppError> {
        for (key, value) in fields {
            match key.as_str() {
                "name" => match value {
                    Value::String(name) if !name.trim().is_empty() => self.name = name,
                    _ => {
                        return Err(AppError::Validation(
                            "name must be a non-empty string".to_string(),
                        ))
                    }
                },
                k if RESERVED_FIELDS.contains(&k) => {}
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Drop reserved keys that may have leaked into `extra` from an older document.
    pub fn normalized(mut self) -> Self {
        self.extra = without_reserved(self.extra);
        self
    }
}

fn without_reserved(mut extra: Map<String, Value>) -> Map<String, Value> {
    extra.retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
    extra
}

/// An artist as returned by the API, with derived data merged in.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistDetails {
    #[serde(flatten)]
    pub artist: Artist,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filmography: Option<Filmography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_photo: Option<String>,
}

/// Request body for creating a new artist.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtistRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filmography: Option<Filmography>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
