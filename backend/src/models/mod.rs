//! Data models for the artist backend.
//!
//! Field names serialize in camelCase to match the admin tool and the public site.

mod artist;
mod export;
mod filmography;
mod photo;

pub use artist::*;
pub use export::*;
pub use filmography::*;
pub use photo::*;
