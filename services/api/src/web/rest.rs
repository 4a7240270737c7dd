//! services/api/src/web/rest.rs
//!
//! Contains the Goodreads import handler and the master definition for the
//! OpenAPI specification.

use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::web::dto::{
    BookResponse, BookshelfConfigurationRequest, BookshelfConfigurationResponse,
    BookshelfResponse, BookshelfSettingRequest, CreateRecommendationRequest, GroupingResponse,
    GroupingSettingRequest, ImportResponse, RecommendationResponse, ReviewListingResponse,
    ReviewResponse, SubtoneConfigRequest, ToneAssignmentItemResponse, ToneAssignmentRequest,
    ToneAssignmentResponse, ToneAssignmentSavedResponse, ToneAssignmentUpdateRequest,
    ToneConfigRequest, ToneConfigurationRequest, ToneNodeResponse, ToneResponse,
    UpdateRecommendationRequest,
};
use crate::web::state::AppState;
use crate::web::{bookshelves, recommendations, reviews, tones};
use axum::{
    extract::{Multipart, State},
    response::Json,
};
use book_catalog_core::import::import_goodreads_csv;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        import_reviews_handler,
        reviews::list_reviews_handler,
        reviews::get_review_handler,
        reviews::search_reviews_handler,
        reviews::get_book_handler,
        bookshelves::list_bookshelves_handler,
        bookshelves::get_bookshelf_handler,
        bookshelves::get_bookshelf_configuration_handler,
        bookshelves::save_bookshelf_configuration_handler,
        tones::list_tones_handler,
        tones::get_tone_handler,
        tones::get_tone_configuration_handler,
        tones::save_tone_configuration_handler,
        tones::get_tone_assignment_handler,
        tones::save_tone_assignment_handler,
        recommendations::list_recommendations_handler,
        recommendations::get_recommendation_handler,
        recommendations::list_book_recommendations_handler,
        recommendations::create_recommendation_handler,
        recommendations::update_recommendation_handler,
    ),
    components(
        schemas(
            ErrorBody,
            ImportResponse,
            BookResponse,
            ReviewResponse,
            ReviewListingResponse,
            BookshelfResponse,
            GroupingResponse,
            BookshelfConfigurationResponse,
            BookshelfConfigurationRequest,
            BookshelfSettingRequest,
            GroupingSettingRequest,
            ToneResponse,
            ToneNodeResponse,
            ToneConfigurationRequest,
            ToneConfigRequest,
            SubtoneConfigRequest,
            ToneAssignmentResponse,
            ToneAssignmentItemResponse,
            ToneAssignmentRequest,
            ToneAssignmentUpdateRequest,
            ToneAssignmentSavedResponse,
            RecommendationResponse,
            CreateRecommendationRequest,
            UpdateRecommendationRequest,
        )
    ),
    tags(
        (name = "Book Catalog API", description = "Goodreads import, reviews, bookshelves and tones.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Import Handler
//=========================================================================================

/// Import a Goodreads library export.
///
/// Accepts a multipart/form-data request; the first file part is read as the
/// CSV export. Rows are reconciled against the catalog one by one and the
/// counters of what happened are returned.
#[utoipa::path(
    post,
    path = "/api/bookreviews/import",
    request_body(content_type = "multipart/form-data", description = "The Goodreads CSV export."),
    responses(
        (status = 200, description = "Import finished", body = ImportResponse),
        (status = 400, description = "No file, or the CSV header is unusable", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn import_reviews_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportResponse>> {
    let (file_name, data) = loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read multipart data: {}", e)))?
            .ok_or_else(|| ApiError::BadRequest("Please select a file to upload".to_string()))?;
        if field.file_name().is_none() {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.csv").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file bytes: {}", e)))?;
        break (name, data);
    };

    if data.is_empty() {
        return Err(ApiError::BadRequest("Please select a file to upload".to_string()));
    }

    info!(file = %file_name, bytes = data.len(), "Starting Goodreads import");
    let options = app_state.import_options();
    let summary = import_goodreads_csv(app_state.store.as_ref(), &data[..], &options).await?;
    Ok(Json(summary.into()))
}
