use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::metrics;

pub mod configurations;
pub mod progress;
pub mod sessions;

pub async fn root() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the Balance Scale Addition Game API"
    }))
}

pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "balance-scale-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn metrics_handler() -> impl IntoResponse {
    match metrics::render_metrics() {
        Ok(metrics_text) => (StatusCode::OK, metrics_text),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to render metrics: {}", e),
        ),
    }
}
