use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Stored collection name.
pub const COLLECTION: &str = "movies";

/// A catalog entry as stored in the `movies` collection. Movies are created
/// by an external loader and are read-only here; wire field names match the
/// stored camelCase documents.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub backdrop_url: String,
    #[serde(default)]
    pub release_date: String,
}

/// A movie enriched with the mean of its review ratings. `avg_rating` is
/// recomputed on every read and never persisted; when a movie has no usable
/// reviews the field is omitted from the serialized body entirely.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieWithRating {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avg_rating: Option<f64>,
}

impl Movie {
    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        bson::from_document(doc).map_err(|e| ModelError::Decode(e.to_string()))
    }
}
