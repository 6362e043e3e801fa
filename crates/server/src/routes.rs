use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Greeting;
use models::movie::{Movie, MovieWithRating};
use models::review::Review;
use models::user;
use service::account::{AccountReceipt, AccountService, LoginOutcome, LoginResult};
use service::catalog::CatalogService;
use service::review::{NewReview, ReviewReceipt, ReviewService};
use service::store::RecordStore;

use crate::errors::ApiError;
use crate::inputs::{parse_movie_id, CredentialsBody, ReviewBody};

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<dyn RecordStore>,
}

pub async fn test_greeting() -> Json<Greeting> {
    Json(Greeting::hello_world())
}

async fn list_movies(
    State(state): State<ServerState>,
) -> Result<Json<Vec<MovieWithRating>>, ApiError> {
    let movies = CatalogService::new(state.store.clone())
        .list_movies_with_ratings()
        .await?;
    Ok(Json(movies))
}

async fn get_movie(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Movie>>, ApiError> {
    let movie_id = parse_movie_id(&id)
        .ok_or_else(|| ApiError::BadRequest(format!("movie id must be an integer, got {id:?}")))?;
    let movies = CatalogService::new(state.store.clone())
        .get_movie_by_id(movie_id)
        .await?;
    Ok(Json(movies))
}

async fn list_reviews(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let movie_id = parse_movie_id(&id)
        .ok_or_else(|| ApiError::BadRequest(format!("movie id must be an integer, got {id:?}")))?;
    let reviews = ReviewService::new(state.store.clone())
        .list_reviews_for_movie(movie_id)
        .await?;
    Ok(Json(reviews))
}

async fn post_review(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(body): Json<ReviewBody>,
) -> Result<Json<ReviewReceipt>, ApiError> {
    // Path id must at least be well-formed; the body's movieId is the one
    // that gets stored, matching the submitted payload contract.
    parse_movie_id(&id)
        .ok_or_else(|| ApiError::BadRequest(format!("movie id must be an integer, got {id:?}")))?;
    let movie_id = body
        .movie_id
        .as_i64()
        .ok_or_else(|| ApiError::BadRequest("movieId must be an integer".into()))?;
    let rating = body
        .rating
        .as_i64()
        .ok_or_else(|| ApiError::BadRequest("rating must be an integer".into()))?;

    let input = NewReview {
        movie_id,
        username: body.username,
        content: body.content,
        rating,
        timestamp: body.timestamp,
    };
    let receipt = ReviewService::new(state.store.clone()).add_review(input).await;
    // failure is reported in the receipt body, not the status code
    Ok(Json(receipt))
}

async fn login(
    State(state): State<ServerState>,
    Json(body): Json<CredentialsBody>,
) -> Result<(StatusCode, Json<LoginResult>), ApiError> {
    user::validate_username(&body.username).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    user::validate_password(&body.password).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let result = AccountService::new(state.store.clone())
        .login(&body.username, &body.password)
        .await?;
    let status = match result.outcome {
        LoginOutcome::Granted => StatusCode::OK,
        LoginOutcome::Denied => StatusCode::UNAUTHORIZED,
        LoginOutcome::AmbiguousAccount => StatusCode::INTERNAL_SERVER_ERROR,
    };
    Ok((status, Json(result)))
}

async fn create_account(
    State(state): State<ServerState>,
    Json(body): Json<CredentialsBody>,
) -> Result<Json<AccountReceipt>, ApiError> {
    user::validate_username(&body.username).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    user::validate_password(&body.password).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let receipt = AccountService::new(state.store.clone())
        .create_account(&body.username, &body.password)
        .await;
    Ok(Json(receipt))
}

/// Build the full application router.
pub fn build_router(cors: CorsLayer, state: ServerState) -> Router {
    Router::new()
        .route("/", get(list_movies))
        .route("/movie/:id", get(get_movie))
        .route("/movie/:id/review", get(list_reviews).post(post_review))
        .route("/login", post(login))
        .route("/createaccount", post(create_account))
        .route("/test", get(test_greeting))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
