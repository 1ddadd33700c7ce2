// ABOUTME: HTTP error type mapping store and request failures to responses
// ABOUTME: Produces consistent JSON error bodies with appropriate status codes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::store::StoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`StoreError`] for persistence failures and adds request-level
/// variants. Implements [`IntoResponse`] to produce consistent JSON error
/// responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Store(store) => match store {
                StoreError::NotFound { .. } => (StatusCode::NOT_FOUND, store.to_string()),
                StoreError::DuplicateName { .. } => (StatusCode::CONFLICT, store.to_string()),
                StoreError::Database(err) => {
                    tracing::error!(error = %err, "database error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "an internal error occurred".to_string(),
                    )
                }
            },
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_string(),
                )
            }
        };

        (status, axum::Json(json!({"error": message}))).into_response()
    }
}
