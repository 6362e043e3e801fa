//! Catalog reads: the movie list enriched with aggregated ratings, and the
//! single-movie lookup.

use std::sync::Arc;

use models::movie::{self, Movie, MovieWithRating};
use models::review;
use mongodb::bson::doc;
use tracing::instrument;

use crate::errors::ServiceError;
use crate::store::RecordStore;

pub struct CatalogService {
    store: Arc<dyn RecordStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All movies with `avg_rating` recomputed from the current review set.
    /// Insertion order of the movie collection is preserved.
    #[instrument(skip(self))]
    pub async fn list_movies_with_ratings(&self) -> Result<Vec<MovieWithRating>, ServiceError> {
        let movie_docs = self.store.find(movie::COLLECTION, doc! {}).await?;
        let review_docs = self.store.find(review::COLLECTION, doc! {}).await?;
        let movies = movie_docs
            .into_iter()
            .map(Movie::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(aggregate::with_ratings(movies, &review_docs))
    }

    /// Zero or one matching movie. The vector return is deliberate: callers
    /// handle the zero-match case without a distinct error path.
    #[instrument(skip(self))]
    pub async fn get_movie_by_id(&self, movie_id: i64) -> Result<Vec<Movie>, ServiceError> {
        let docs = self
            .store
            .find(movie::COLLECTION, doc! { "movieId": movie_id })
            .await?;
        docs.into_iter()
            .map(|d| Movie::from_document(d).map_err(ServiceError::from))
            .collect()
    }
}

pub mod aggregate {
    //! Left outer join of movies onto reviews grouped by `movieId`, with a
    //! mean over the usable ratings of each group. Every movie appears
    //! exactly once in the output regardless of review count.

    use std::collections::HashMap;

    use models::movie::{Movie, MovieWithRating};
    use mongodb::bson::{Bson, Document};

    /// Reviews with a missing or non-numeric `rating` are skipped rather
    /// than failing the whole pass; a movie whose every rating is unusable
    /// aggregates to `None`, the same as having no reviews.
    pub fn with_ratings(movies: Vec<Movie>, reviews: &[Document]) -> Vec<MovieWithRating> {
        let mut groups: HashMap<i64, (f64, u64)> = HashMap::new();
        for doc in reviews {
            let Some(movie_id) = integer(doc.get("movieId")) else { continue };
            let Some(rating) = numeric(doc.get("rating")) else { continue };
            let entry = groups.entry(movie_id).or_insert((0.0, 0));
            entry.0 += rating;
            entry.1 += 1;
        }

        movies
            .into_iter()
            .map(|movie| {
                let avg_rating = groups
                    .get(&movie.movie_id)
                    .map(|(sum, count)| sum / *count as f64);
                MovieWithRating { movie, avg_rating }
            })
            .collect()
    }

    fn integer(value: Option<&Bson>) -> Option<i64> {
        match value {
            Some(Bson::Int32(n)) => Some(*n as i64),
            Some(Bson::Int64(n)) => Some(*n),
            _ => None,
        }
    }

    fn numeric(value: Option<&Bson>) -> Option<f64> {
        match value {
            Some(Bson::Int32(n)) => Some(*n as f64),
            Some(Bson::Int64(n)) => Some(*n as f64),
            Some(Bson::Double(d)) if d.is_finite() => Some(*d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use mongodb::bson::doc;

    fn movie_doc(id: i64, title: &str) -> mongodb::bson::Document {
        doc! { "movieId": id, "title": title, "overview": "", "imageUrl": "", "backdropUrl": "", "releaseDate": "" }
    }

    fn review_doc(movie_id: i64, rating: i64) -> mongodb::bson::Document {
        doc! { "movieId": movie_id, "username": "u", "content": "", "rating": rating, "reviewTimestamp": "" }
    }

    #[tokio::test]
    async fn averages_match_reviews() {
        let store = MemoryStore::new();
        store.seed(models::movie::COLLECTION, vec![movie_doc(42, "Answer"), movie_doc(7, "Seven")]);
        store.seed(
            models::review::COLLECTION,
            vec![review_doc(42, 4), review_doc(42, 2)],
        );
        let svc = CatalogService::new(std::sync::Arc::new(store));

        let listed = svc.list_movies_with_ratings().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].movie.movie_id, 42);
        assert_eq!(listed[0].avg_rating, Some(3.0));
        // no reviews: absent, not zero
        assert_eq!(listed[1].movie.movie_id, 7);
        assert_eq!(listed[1].avg_rating, None);
    }

    #[tokio::test]
    async fn recomputes_on_every_read() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.seed(models::movie::COLLECTION, vec![movie_doc(1, "One")]);
        store.seed(models::review::COLLECTION, vec![review_doc(1, 5)]);
        let svc = CatalogService::new(store.clone());

        assert_eq!(svc.list_movies_with_ratings().await.unwrap()[0].avg_rating, Some(5.0));
        store.seed(models::review::COLLECTION, vec![review_doc(1, 1)]);
        assert_eq!(svc.list_movies_with_ratings().await.unwrap()[0].avg_rating, Some(3.0));
    }

    #[tokio::test]
    async fn unusable_ratings_are_skipped() {
        let store = MemoryStore::new();
        store.seed(models::movie::COLLECTION, vec![movie_doc(9, "Nine"), movie_doc(10, "Ten")]);
        store.seed(
            models::review::COLLECTION,
            vec![
                doc! { "movieId": 9_i64, "username": "a", "rating": "five" },
                doc! { "movieId": 9_i64, "username": "b" },
                doc! { "movieId": 9_i64, "username": "c", "rating": 2_i64 },
                doc! { "movieId": 10_i64, "username": "d", "rating": "broken" },
            ],
        );
        let svc = CatalogService::new(std::sync::Arc::new(store));

        let listed = svc.list_movies_with_ratings().await.unwrap();
        // only the numeric rating counts toward the mean
        assert_eq!(listed[0].avg_rating, Some(2.0));
        // every rating unusable behaves like no reviews at all
        assert_eq!(listed[1].avg_rating, None);
    }

    #[tokio::test]
    async fn mixed_bson_number_widths_average_together() {
        let store = MemoryStore::new();
        store.seed(models::movie::COLLECTION, vec![movie_doc(3, "Three")]);
        store.seed(
            models::review::COLLECTION,
            vec![
                doc! { "movieId": 3_i64, "username": "a", "rating": 4_i32 },
                doc! { "movieId": 3_i64, "username": "b", "rating": 2_i64 },
                doc! { "movieId": 3_i64, "username": "c", "rating": 3.0 },
            ],
        );
        let svc = CatalogService::new(std::sync::Arc::new(store));
        assert_eq!(svc.list_movies_with_ratings().await.unwrap()[0].avg_rating, Some(3.0));
    }

    #[tokio::test]
    async fn lookup_returns_zero_or_one() {
        let store = MemoryStore::new();
        store.seed(models::movie::COLLECTION, vec![movie_doc(42, "Answer")]);
        let svc = CatalogService::new(std::sync::Arc::new(store));

        let hit = svc.get_movie_by_id(42).await.unwrap();
        assert_eq!(hit.len(), 1);
        assert_eq!(hit[0].title, "Answer");

        let miss = svc.get_movie_by_id(404).await.unwrap();
        assert!(miss.is_empty());
    }

    #[tokio::test]
    async fn store_outage_propagates() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let svc = CatalogService::new(std::sync::Arc::new(store));
        assert!(svc.list_movies_with_ratings().await.is_err());
    }
}
