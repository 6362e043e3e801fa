//! Review listing and submission for a single movie.

use std::sync::Arc;

use models::review::{self, Review};
use mongodb::bson::doc;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::errors::ServiceError;
use crate::store::RecordStore;

pub const POSTED_MESSAGE: &str = "Posted review";
pub const POST_FAILED_MESSAGE: &str = "Failed to post review";

/// Submission input. The timestamp arrives from the caller and is stored
/// verbatim; the rating is an unconstrained integer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReview {
    pub movie_id: i64,
    pub username: String,
    pub content: String,
    pub rating: i64,
    pub timestamp: String,
}

/// Shaped result of a submission. The receipt is always produced; store
/// failure flips `posted` and the message, never the response shape.
/// Status-code escalation belongs to the HTTP layer.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewReceipt {
    pub posted: bool,
    pub message: String,
}

pub struct ReviewService {
    store: Arc<dyn RecordStore>,
}

impl ReviewService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All reviews for a movie, no ordering guarantee. Stored documents
    /// that no longer decode as reviews are skipped with a warning rather
    /// than failing the listing.
    #[instrument(skip(self))]
    pub async fn list_reviews_for_movie(&self, movie_id: i64) -> Result<Vec<Review>, ServiceError> {
        let docs = self
            .store
            .find(review::COLLECTION, doc! { "movieId": movie_id })
            .await?;
        let mut reviews = Vec::with_capacity(docs.len());
        for doc in docs {
            match Review::from_document(doc) {
                Ok(r) => reviews.push(r),
                Err(e) => warn!(movie_id, error = %e, "skipping undecodable review record"),
            }
        }
        Ok(reviews)
    }

    #[instrument(skip(self, input), fields(movie_id = input.movie_id, username = %input.username))]
    pub async fn add_review(&self, input: NewReview) -> ReviewReceipt {
        let record = doc! {
            "username": &input.username,
            "movieId": input.movie_id,
            "content": &input.content,
            "rating": input.rating,
            "reviewTimestamp": &input.timestamp,
        };
        match self.store.insert(review::COLLECTION, record).await {
            Ok(_) => ReviewReceipt { posted: true, message: POSTED_MESSAGE.into() },
            Err(e) => {
                warn!(movie_id = input.movie_id, error = %e, "review insert failed");
                ReviewReceipt { posted: false, message: POST_FAILED_MESSAGE.into() }
            }
        }
    }
}
