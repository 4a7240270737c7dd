//! services/api/src/web/tones.rs
//!
//! Tone catalog, tone configuration and the tone assignment workflow.

use crate::error::ApiResult;
use crate::web::dto::{
    convert_all, ToneAssignmentRequest, ToneAssignmentResponse, ToneAssignmentSavedResponse,
    ToneConfigurationRequest, ToneNodeResponse, ToneResponse,
};
use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    response::Json,
};
use book_catalog_core::assignment::{load_tone_assignment, save_tone_assignment, ToneAssignmentUpdate};
use book_catalog_core::ports::PortError;
use book_catalog_core::tones::{build_tone_tree, configure_tones, ToneConfigItem};
use std::sync::Arc;
use uuid::Uuid;

/// List tones as a tree of top-level tones and their subtones.
#[utoipa::path(
    get,
    path = "/api/tones",
    responses((status = 200, description = "The tone tree, by name", body = [ToneNodeResponse]))
)]
pub async fn list_tones_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ToneNodeResponse>>> {
    let tones = app_state.store.list_tones().await?;
    Ok(Json(convert_all(build_tone_tree(tones))))
}

#[utoipa::path(
    get,
    path = "/api/tones/{id}",
    params(("id" = Uuid, Path, description = "The tone id.")),
    responses(
        (status = 200, description = "The tone", body = ToneResponse),
        (status = 404, description = "No tone with this id")
    )
)]
pub async fn get_tone_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ToneResponse>> {
    let tone = app_state
        .store
        .list_tones()
        .await?
        .into_iter()
        .find(|t| t.id == id)
        .ok_or_else(|| PortError::NotFound(format!("Tone {} not found", id)))?;
    Ok(Json(tone.into()))
}

#[utoipa::path(
    get,
    path = "/api/tones/configuration",
    responses((status = 200, description = "The tone tree being configured", body = [ToneNodeResponse]))
)]
pub async fn get_tone_configuration_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<ToneNodeResponse>>> {
    list_tones_handler(State(app_state)).await
}

/// Create, update and remove tones and their subtones.
///
/// Removing a tone removes its subtones. Names must be unique.
#[utoipa::path(
    post,
    path = "/api/tones/configuration",
    request_body = ToneConfigurationRequest,
    responses(
        (status = 200, description = "The resulting tone tree", body = [ToneNodeResponse]),
        (status = 400, description = "Empty or duplicate names"),
        (status = 404, description = "Unknown tone id")
    )
)]
pub async fn save_tone_configuration_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ToneConfigurationRequest>,
) -> ApiResult<Json<Vec<ToneNodeResponse>>> {
    let items: Vec<ToneConfigItem> = convert_all(request.tones);
    let tree = configure_tones(app_state.store.as_ref(), &items).await?;
    Ok(Json(convert_all(tree)))
}

/// Fiction reviews split by whether they have tones yet, with suggestions.
#[utoipa::path(
    get,
    path = "/api/tones/assignment",
    responses((status = 200, description = "Reviews awaiting or carrying tones", body = ToneAssignmentResponse))
)]
pub async fn get_tone_assignment_handler(
    State(app_state): State<Arc<AppState>>,
) -> ApiResult<Json<ToneAssignmentResponse>> {
    let assignment = load_tone_assignment(app_state.store.as_ref(), &app_state.lexicon).await?;
    Ok(Json(assignment.into()))
}

/// Replace the tone set of each listed review's book.
#[utoipa::path(
    post,
    path = "/api/tones/assignment",
    request_body = ToneAssignmentRequest,
    responses((status = 200, description = "Number of books updated", body = ToneAssignmentSavedResponse))
)]
pub async fn save_tone_assignment_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<ToneAssignmentRequest>,
) -> ApiResult<Json<ToneAssignmentSavedResponse>> {
    let updates: Vec<ToneAssignmentUpdate> = convert_all(request.assignments);
    let updated = save_tone_assignment(app_state.store.as_ref(), &updates).await?;
    Ok(Json(ToneAssignmentSavedResponse { updated }))
}
