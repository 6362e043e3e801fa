use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Stored collection name. Singular, matching the original data set.
pub const COLLECTION: &str = "review";

/// A review as stored in the `review` collection. `movie_id` is a foreign
/// reference by convention only; the store does not enforce it. The
/// timestamp is caller-supplied free text and stored as given.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub movie_id: i64,
    pub username: String,
    #[serde(default)]
    pub content: String,
    pub rating: i64,
    #[serde(default)]
    pub review_timestamp: String,
}

impl Review {
    pub fn from_document(doc: Document) -> Result<Self, ModelError> {
        bson::from_document(doc).map_err(|e| ModelError::Decode(e.to_string()))
    }

    pub fn to_document(&self) -> Result<Document, ModelError> {
        bson::to_document(self).map_err(|e| ModelError::Decode(e.to_string()))
    }
}
