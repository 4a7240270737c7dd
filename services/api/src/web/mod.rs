pub mod bookshelves;
pub mod dto;
pub mod recommendations;
pub mod rest;
pub mod reviews;
pub mod state;
pub mod tones;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use rest::{import_reviews_handler, ApiDoc};
pub use state::AppState;

/// Builds the `/api` router over the shared state.
pub fn build_router(app_state: Arc<AppState>) -> Router {
    let upload_limit = app_state.config.max_upload_bytes;

    let review_routes = Router::new()
        .route("/api/bookreviews", get(reviews::list_reviews_handler))
        .route("/api/bookreviews/search", get(reviews::search_reviews_handler))
        .route("/api/bookreviews/{id}", get(reviews::get_review_handler))
        .route(
            "/api/bookreviews/import",
            post(import_reviews_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/books/{id}", get(reviews::get_book_handler));

    let bookshelf_routes = Router::new()
        .route("/api/bookshelves", get(bookshelves::list_bookshelves_handler))
        .route(
            "/api/bookshelves/configuration",
            get(bookshelves::get_bookshelf_configuration_handler)
                .post(bookshelves::save_bookshelf_configuration_handler),
        )
        .route("/api/bookshelves/{id}", get(bookshelves::get_bookshelf_handler));

    let tone_routes = Router::new()
        .route("/api/tones", get(tones::list_tones_handler))
        .route(
            "/api/tones/configuration",
            get(tones::get_tone_configuration_handler).post(tones::save_tone_configuration_handler),
        )
        .route(
            "/api/tones/assignment",
            get(tones::get_tone_assignment_handler).post(tones::save_tone_assignment_handler),
        )
        .route("/api/tones/{id}", get(tones::get_tone_handler));

    let recommendation_routes = Router::new()
        .route(
            "/api/book-tone-recommendations",
            get(recommendations::list_recommendations_handler)
                .post(recommendations::create_recommendation_handler),
        )
        .route(
            "/api/book-tone-recommendations/book/{book_id}",
            get(recommendations::list_book_recommendations_handler),
        )
        .route(
            "/api/book-tone-recommendations/{id}",
            get(recommendations::get_recommendation_handler)
                .put(recommendations::update_recommendation_handler),
        );

    Router::new()
        .merge(review_routes)
        .merge(bookshelf_routes)
        .merge(tone_routes)
        .merge(recommendation_routes)
        .with_state(app_state)
}
