//! Object key layout of the bucket.
//!
//! ```text
//! data/artists.json                          artist collection
//! data/filmography/{artistId}.json           per-artist filmography
//! data/photos/{artistId}.json                per-artist photo metadata
//! artists/{artistId}/photos/{photoId}.{ext}  uploaded originals
//! artists/{artistId}/main.{ext}              main photo copy
//! ```

use std::path::Path;

use crate::errors::AppError;

pub const ARTISTS: &str = "data/artists.json";

/// Extension used when an upload has none.
pub const DEFAULT_PHOTO_EXTENSION: &str = "jpg";

pub fn filmography(artist_id: &str) -> String {
    format!("data/filmography/{}.json", artist_id)
}

pub fn photo_metadata(artist_id: &str) -> String {
    format!("data/photos/{}.json", artist_id)
}

/// Everything stored for an artist (photos and main photo).
pub fn artist_prefix(artist_id: &str) -> String {
    format!("artists/{}/", artist_id)
}

pub fn photos_prefix(artist_id: &str) -> String {
    format!("artists/{}/photos/", artist_id)
}

/// Prefix matching one photo regardless of its extension.
pub fn photo_prefix(artist_id: &str, photo_id: &str) -> String {
    format!("artists/{}/photos/{}.", artist_id, photo_id)
}

pub fn photo(artist_id: &str, photo_id: &str, extension: &str) -> String {
    format!("artists/{}/photos/{}.{}", artist_id, photo_id, extension)
}

pub fn main_photo_prefix(artist_id: &str) -> String {
    format!("artists/{}/main.", artist_id)
}

pub fn main_photo(artist_id: &str, extension: &str) -> String {
    format!("artists/{}/main.{}", artist_id, extension)
}

/// Photo id of a photo key: the file name without its extension.
pub fn photo_id_from_key(key: &str) -> &str {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    match file_name.rfind('.') {
        Some(idx) if idx > 0 => &file_name[..idx],
        _ => file_name,
    }
}

/// Lower-cased extension of a file name or key, if it is a plain alphanumeric one.
pub fn extension_of(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    if !ext.is_empty() && ext.len() <= 10 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext.to_ascii_lowercase())
    } else {
        None
    }
}

/// Content type for a file extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "json" => "application/json",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// Content type implied by a key's extension.
pub fn content_type_for_key(key: &str) -> &'static str {
    extension_of(key)
        .map(|ext| content_type_for(&ext))
        .unwrap_or("application/octet-stream")
}

/// Check that a path parameter is usable as a single key segment.
pub fn validate_id<'a>(kind: &str, id: &'a str) -> Result<&'a str, AppError> {
    let valid = !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\'])
        && !id.chars().any(char::is_control);

    if valid {
        Ok(id)
    } else {
        Err(AppError::BadRequest(format!("Invalid {} id: {:?}", kind, id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        assert_eq!(filmography("a1"), "data/filmography/a1.json");
        assert_eq!(photo("a1", "p1", "png"), "artists/a1/photos/p1.png");
        assert_eq!(main_photo("a1", "webp"), "artists/a1/main.webp");
        assert!(photo("a1", "p1", "png").starts_with(&photo_prefix("a1", "p1")));
        assert!(!photo("a1", "p10", "png").starts_with(&photo_prefix("a1", "p1")));
    }

    #[test]
    fn test_photo_id_from_key() {
        assert_eq!(photo_id_from_key("artists/a1/photos/p1.jpg"), "p1");
        assert_eq!(photo_id_from_key("artists/a1/photos/p1"), "p1");
        assert_eq!(photo_id_from_key("artists/a1/photos/p1.tar.gz"), "p1.tar");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("Headshot.PNG").as_deref(), Some("png"));
        assert_eq!(extension_of("photo"), None);
        assert_eq!(extension_of("weird.j p g"), None);
        assert_eq!(content_type_for("jpeg"), "image/jpeg");
        assert_eq!(content_type_for("xyz"), "application/octet-stream");
        assert_eq!(content_type_for_key("data/artists.json"), "application/json");
        assert_eq!(content_type_for_key("artists/a1/main.WEBP"), "image/webp");
        assert_eq!(content_type_for_key("artists/a1/main"), "application/octet-stream");
    }

    #[test]
    fn test_validate_id() {
        assert!(validate_id("artist", "3f2a").is_ok());
        assert!(validate_id("artist", "..").is_err());
        assert!(validate_id("artist", "a/b").is_err());
        assert!(validate_id("photo", "").is_err());
    }
}
