//! services/api/src/web/reviews.rs
//!
//! Read endpoints for book reviews and books.

use crate::error::ApiResult;
use crate::web::dto::{
    convert_all, BookResponse, ReviewListQuery, ReviewListingResponse, ReviewResponse, SearchQuery,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use book_catalog_core::reviews::{list_reviews, search_reviews, ReviewQuery};
use std::sync::Arc;
use uuid::Uuid;

/// List reviews with written content.
///
/// `recent` wins over `grouping`, which wins over `shelf`. Without any filter
/// the `favorites` shelf is listed.
#[utoipa::path(
    get,
    path = "/api/bookreviews",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Reviews with the navigation they are shown with", body = ReviewListingResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_reviews_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ReviewListQuery>,
) -> ApiResult<Json<ReviewListingResponse>> {
    let query = ReviewQuery {
        shelf: query.shelf,
        grouping: query.grouping,
        recent: query.recent,
    };
    let listing = list_reviews(app_state.store.as_ref(), &query).await?;
    Ok(Json(listing.into()))
}

/// Get a single review with its book and tags.
#[utoipa::path(
    get,
    path = "/api/bookreviews/{id}",
    params(("id" = Uuid, Path, description = "The review id.")),
    responses(
        (status = 200, description = "The review", body = ReviewResponse),
        (status = 404, description = "No review with this id")
    )
)]
pub async fn get_review_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReviewResponse>> {
    let entry = app_state.store.get_review_entry(id).await?;
    Ok(Json(entry.into()))
}

/// Search reviews by title, author, publisher and shelves.
#[utoipa::path(
    get,
    path = "/api/bookreviews/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "At most fifty matching reviews, newest first", body = [ReviewResponse])
    )
)]
pub async fn search_reviews_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<ReviewResponse>>> {
    let matches = search_reviews(app_state.store.as_ref(), &query.q).await?;
    Ok(Json(convert_all(matches)))
}

/// Get a book with its shelves and tones.
#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "The book id.")),
    responses(
        (status = 200, description = "The book", body = BookResponse),
        (status = 404, description = "No book with this id")
    )
)]
pub async fn get_book_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookResponse>> {
    let detail = app_state.store.get_book(id).await?;
    Ok(Json(detail.into()))
}
