//! Maps domain failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::DomainError;
use serde_json::json;
use tracing::error;

/// Web-facing wrapper around [`DomainError`].
#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::NotFound(_, _) => (StatusCode::NOT_FOUND, self.0.to_string()),
            DomainError::Validation(_) => (StatusCode::BAD_REQUEST, self.0.to_string()),
            DomainError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.0.to_string()),
            DomainError::Conflict(_) => (StatusCode::CONFLICT, self.0.to_string()),
            DomainError::Internal(detail) => {
                // Detail stays in the logs; clients get a generic message.
                error!(%detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "message": message }))).into_response()
    }
}
