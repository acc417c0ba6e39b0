#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use balance_scale_api::{config::Config, create_router, services::AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        target_seed: Some(7),
        ..Config::default()
    }
}

pub fn create_test_app() -> Router {
    create_app_with(test_config())
}

pub fn create_app_with(config: Config) -> Router {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();

    let app_state = Arc::new(AppState::new(config));
    create_router(app_state)
}

/// Sends a request and returns status plus parsed JSON body (Null if empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            panic!(
                "non-JSON body for {} {}: {}",
                method,
                uri,
                String::from_utf8_lossy(&bytes)
            )
        })
    };

    (status, json)
}

pub fn configuration_body(id: Option<&str>, created_by: &str, min: i64, max: i64) -> Value {
    json!({
        "id": id,
        "title": "Balance the scale",
        "difficulty": "beginner",
        "target_range": { "min": min, "max": max },
        "created_by": created_by
    })
}

/// Creates a configuration and returns its id.
pub async fn create_configuration(app: &Router, body: Value) -> String {
    let (status, json) = send(app, "POST", "/api/game/configurations", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", json);
    json["id"].as_str().unwrap().to_string()
}

/// Creates a session and returns its JSON.
pub async fn create_session(app: &Router, user_id: &str, config_id: &str) -> Value {
    let uri = format!(
        "/api/game/sessions?user_id={}&config_id={}",
        user_id, config_id
    );
    let (status, json) = send(app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::CREATED, "body: {}", json);
    json
}
