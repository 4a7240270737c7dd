//! services/api/src/web/recommendations.rs
//!
//! Feedback on suggested tones.

use crate::error::ApiResult;
use crate::web::dto::{
    convert_all, CreateRecommendationRequest, RecommendationQuery, RecommendationResponse,
    UpdateRecommendationRequest,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use book_catalog_core::domain::NewBookToneRecommendation;
use book_catalog_core::recommendations::{
    create_recommendation, list_recommendations, update_recommendation, RecommendationFilter,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/book-tone-recommendations",
    params(RecommendationQuery),
    responses((status = 200, description = "Matching recommendations", body = [RecommendationResponse]))
)]
pub async fn list_recommendations_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<RecommendationQuery>,
) -> ApiResult<Json<Vec<RecommendationResponse>>> {
    let filter = RecommendationFilter {
        book_id: query.book_id,
        tone: query.tone,
    };
    let items = list_recommendations(app_state.store.as_ref(), &filter).await?;
    Ok(Json(convert_all(items)))
}

#[utoipa::path(
    get,
    path = "/api/book-tone-recommendations/{id}",
    params(("id" = Uuid, Path, description = "The recommendation id.")),
    responses(
        (status = 200, description = "The recommendation", body = RecommendationResponse),
        (status = 404, description = "No recommendation with this id")
    )
)]
pub async fn get_recommendation_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RecommendationResponse>> {
    let item = app_state.store.get_tone_recommendation(id).await?;
    Ok(Json(item.into()))
}

#[utoipa::path(
    get,
    path = "/api/book-tone-recommendations/book/{book_id}",
    params(("book_id" = Uuid, Path, description = "The book id.")),
    responses((status = 200, description = "Recommendations for the book", body = [RecommendationResponse]))
)]
pub async fn list_book_recommendations_handler(
    State(app_state): State<Arc<AppState>>,
    Path(book_id): Path<Uuid>,
) -> ApiResult<Json<Vec<RecommendationResponse>>> {
    let filter = RecommendationFilter {
        book_id: Some(book_id),
        tone: None,
    };
    let items = list_recommendations(app_state.store.as_ref(), &filter).await?;
    Ok(Json(convert_all(items)))
}

/// Record feedback for a (book, tone) pair.
#[utoipa::path(
    post,
    path = "/api/book-tone-recommendations",
    request_body = CreateRecommendationRequest,
    responses(
        (status = 201, description = "Feedback recorded", body = RecommendationResponse),
        (status = 400, description = "Unknown book, feedback out of range, or a duplicate pair")
    )
)]
pub async fn create_recommendation_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CreateRecommendationRequest>,
) -> ApiResult<impl IntoResponse> {
    let created = create_recommendation(
        app_state.store.as_ref(),
        NewBookToneRecommendation {
            book_id: request.book_id,
            tone: request.tone.trim().to_string(),
            feedback: request.feedback,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(RecommendationResponse::from(created))))
}

#[utoipa::path(
    put,
    path = "/api/book-tone-recommendations/{id}",
    params(("id" = Uuid, Path, description = "The recommendation id.")),
    request_body = UpdateRecommendationRequest,
    responses(
        (status = 200, description = "The updated recommendation", body = RecommendationResponse),
        (status = 400, description = "Feedback out of range"),
        (status = 404, description = "No recommendation with this id")
    )
)]
pub async fn update_recommendation_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateRecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    let updated = update_recommendation(
        app_state.store.as_ref(),
        id,
        request.feedback,
        request.tone_id,
    )
    .await?;
    Ok(Json(updated.into()))
}
