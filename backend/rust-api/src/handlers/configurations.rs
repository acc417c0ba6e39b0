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
    models::{CreateConfigurationRequest, ListConfigurationsQuery},
    services::{configuration_service::ConfigurationService, AppState},
};

/// POST /api/game/configurations
pub async fn create_configuration(
    State(state): State<Arc<AppState>>,
    CanonicalJson(req): CanonicalJson<CreateConfigurationRequest>,
) -> AppResult<impl IntoResponse> {
    req.validate()?;

    let service = ConfigurationService::new(state.store.clone());
    let config = service.create(req).await?;

    Ok((StatusCode::CREATED, Json(config)))
}

/// GET /api/game/configurations
pub async fn list_configurations(
    State(state): State<Arc<AppState>>,
    AppQuery(query): AppQuery<ListConfigurationsQuery>,
) -> AppResult<impl IntoResponse> {
    query.validate()?;

    let service = ConfigurationService::new(state.store.clone());
    let configs = service.list(&query).await?;

    Ok(Json(configs))
}

/// GET /api/game/configurations/{id}
pub async fn get_configuration(
    State(state): State<Arc<AppState>>,
    Path(config_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let service = ConfigurationService::new(state.store.clone());
    let config = service.get(&config_id).await?;

    Ok(Json(config))
}
