//! services/api/src/web/bookshelves.rs
//!
//! Bookshelf listing and the display/grouping configuration endpoints.

use crate::error::ApiResult;
use crate::web::dto::{
    convert_all, BookshelfConfigurationRequest, BookshelfConfigurationResponse, BookshelfResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use book_catalog_core::configuration::{
    load_bookshelf_configuration, save_bookshelf_configuration, BookshelfConfigurationUpdate,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/bookshelves",
    responses((status = 200, description = "Every bookshelf, by name", body = [BookshelfResponse]))
)]
pub async fn list_bookshelves_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BookshelfResponse>>> {
    let mut shelves = app_state.store.list_bookshelves().await?;
    shelves.sort_by_key(|s| s.name.to_lowercase());
    Ok(Json(convert_all(shelves)))
}

#[utoipa::path(
    get,
    path = "/api/bookshelves/{id}",
    params(("id" = Uuid, Path, description = "The bookshelf id.")),
    responses(
        (status = 200, description = "The bookshelf", body = BookshelfResponse),
        (status = 404, description = "No bookshelf with this id")
    )
)]
pub async fn get_bookshelf_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<BookshelfResponse>> {
    let shelf = app_state.store.get_bookshelf(id).await?;
    Ok(Json(shelf.into()))
}

#[utoipa::path(
    get,
    path = "/api/bookshelves/configuration",
    responses((status = 200, description = "Display flags and groupings", body = BookshelfConfigurationResponse))
)]
pub async fn get_bookshelf_configuration_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<BookshelfConfigurationResponse>> {
    let config = load_bookshelf_configuration(app_state.store.as_ref()).await?;
    Ok(Json(config.into()))
}

/// Save display flags and groupings.
///
/// Turning custom mappings off resets every shelf's display flag. Shelves in
/// a grouping take its genre flags.
#[utoipa::path(
    post,
    path = "/api/bookshelves/configuration",
    request_body = BookshelfConfigurationRequest,
    responses(
        (status = 200, description = "The saved configuration", body = BookshelfConfigurationResponse),
        (status = 400, description = "Invalid or duplicate grouping names"),
        (status = 404, description = "Unknown grouping id")
    )
)]
pub async fn save_bookshelf_configuration_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<BookshelfConfigurationRequest>,
) -> ApiResult<Json<BookshelfConfigurationResponse>> {
    let update: BookshelfConfigurationUpdate = request.into();
    let config = save_bookshelf_configuration(app_state.store.as_ref(), &update).await?;
    Ok(Json(config.into()))
}
