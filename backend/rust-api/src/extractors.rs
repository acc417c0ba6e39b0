use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::AppError;
use crate::utils::field_names::canonicalize;

/// JSON body extractor that accepts both the legacy camel-case field names
/// and the canonical snake_case ones, and answers with JSON errors.
///
/// Bodies that are not JSON at all get 400; JSON that does not fit `T` gets
/// the same 422 as any other validation failure.
pub struct CanonicalJson<T>(pub T);

impl<T, S> FromRequest<S> for CanonicalJson<T>
where
    T: DeserializeOwned + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(raw) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                let message = format!("Failed to parse JSON request body: {}", rejection);
                tracing::warn!("{}", message);
                let body = json!({
                    "detail": message,
                    "status": 400
                });
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            })?;

        serde_json::from_value(canonicalize(raw))
            .map(CanonicalJson)
            .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e)).into_response())
    }
}

/// Query-string extractor with JSON rejections.
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| AppQuery(value))
            .map_err(|rejection| {
                AppError::Validation(format!("Invalid query parameters: {}", rejection))
                    .into_response()
            })
    }
}
