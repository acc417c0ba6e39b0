use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use services::AppState;

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = cors_layer(&app_state.config.cors_allowed_origins);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/game", game_routes())
        .with_state(app_state)
        .layer(cors)
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(middleware::from_fn(
            middlewares::trace::trace_context_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn game_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/configurations",
            get(handlers::configurations::list_configurations)
                .post(handlers::configurations::create_configuration),
        )
        .route(
            "/configurations/{id}",
            get(handlers::configurations::get_configuration),
        )
        .route("/sessions", post(handlers::sessions::create_session))
        .route(
            "/sessions/current/attempts",
            post(handlers::sessions::record_current_attempt),
        )
        .route("/sessions/{id}", get(handlers::sessions::get_session))
        .route(
            "/sessions/{id}/complete",
            post(handlers::sessions::complete_session),
        )
        .route(
            "/sessions/{id}/attempts",
            post(handlers::sessions::record_attempt),
        )
        .route("/progress", post(handlers::progress::upsert_progress))
        .route("/progress/{user_id}", get(handlers::progress::list_progress))
        .route(
            "/progress/{user_id}/{activity_id}",
            get(handlers::progress::get_progress),
        )
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // Credentials cannot be combined with a wildcard origin
    if origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS allows any origin; credentials are disabled");
        return cors.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
