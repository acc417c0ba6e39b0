use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    error::AppResult,
    extractors::{AppQuery, CanonicalJson},
    models::{AttemptRequest, CreateSessionQuery},
    services::{attempt_service::AttemptService, session_service::SessionService, AppState},
};

/// POST /api/game/sessions?user_id=..&config_id=..
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<CreateSessionQuery>,
) -> AppResult<impl IntoResponse> {
    query.validate()?;
    tracing::info!(
        "Creating session for user_id={}, config_id={}",
        query.user_id,
        query.config_id
    );

    let service = SessionService::new(state.store.clone(), state.targets.clone());
    let session = service
        .create_session(&query.user_id, &query.config_id)
        .await?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/game/sessions/{id}
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = SessionService::new(state.store.clone(), state.targets.clone());
    let session = service.get_session(&session_id).await?;

    Ok(Json(session))
}

/// POST /api/game/sessions/{id}/complete
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = SessionService::new(state.store.clone(), state.targets.clone());
    let session = service.complete_session(&session_id).await?;

    Ok(Json(session))
}

/// POST /api/game/sessions/{id}/attempts
pub async fn record_attempt(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    CanonicalJson(req): CanonicalJson<AttemptRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;

    let service = AttemptService::new(state.store.clone(), state.targets.clone());
    let attempt = service.record_attempt(&session_id, req).await?;

    Ok(Json(attempt))
}

/// POST /api/game/sessions/current/attempts
pub async fn record_current_attempt(
    State(state): State<Arc<AppState>>,
    CanonicalJson(req): CanonicalJson<AttemptRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;

    let service = AttemptService::new(state.store.clone(), state.targets.clone());
    let attempt = service.record_current_attempt(req).await?;

    Ok(Json(attempt))
}
