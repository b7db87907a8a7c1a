//! Filmography model.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Categorized work credits of one artist.
///
/// Entries are opaque JSON values owned by the client. Missing categories read as
/// empty lists; unknown categories are kept as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Filmography {
    #[serde(default)]
    pub dramas: Vec<Value>,
    #[serde(default)]
    pub movies: Vec<Value>,
    #[serde(default)]
    pub commercials: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
