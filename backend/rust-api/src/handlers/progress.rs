use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppResult,
    extractors::CanonicalJson,
    models::UpsertProgressRequest,
    services::{progress_service::ProgressService, AppState},
};

/// POST /api/game/progress
pub async fn upsert_progress(
    State(state): State<Arc<AppState>>,
    CanonicalJson(req): CanonicalJson<UpsertProgressRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;

    let service = ProgressService::new(state.store.clone());
    let progress = service.upsert(req.into_progress(Utc::now())).await?;

    Ok(Json(progress))
}

/// GET /api/game/progress/{user_id}
pub async fn list_progress(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ProgressService::new(state.store.clone());
    let records = service.list_for_user(&user_id).await?;

    Ok(Json(records))
}

/// GET /api/game/progress/{user_id}/{activity_id}
pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    Path((user_id, activity_id)): Path<(String, String)>,
) -> AppResult<impl IntoResponse> {
    let service = ProgressService::new(state.store.clone());
    let progress = service.get(&user_id, &activity_id).await?;

    Ok(Json(progress))
}
