//! Public export models for the agency website.

use serde::Serialize;

use super::Filmography;

/// Display document for one artist, keyed by name in the export.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistExport {
    pub id: String,
    pub name: String,
    pub title: String,
    pub filmography: Filmography,
    pub main_photo: Option<String>,
}

impl ArtistExport {
    pub fn title_for(name: &str) -> String {
        format!("{} | Filmography", name)
    }
}
