//! API error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use meditations_core::ServiceError;
use meditations_persistence::PersistenceError;
use meditations_telegram::TelegramError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// API error type for consistent error responses.
///
/// Every variant renders as `{ "ok": false, "error": <message> }`. Internal
/// errors only expose a generic message; the detail goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("{0}")]
    BadRequest(String),

    /// Init data missing or failed verification.
    #[error("{0}")]
    Unauthorized(String),

    /// Host not allowed for this path.
    #[error("forbidden")]
    Forbidden,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Stale revision.
    #[error("{0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Service unavailable.
    #[error("{0}")]
    ServiceUnavailable(String),
}

impl ApiError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message placed in the response body.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let ApiError::Internal(detail) = &self {
            error!(error = %detail, "Request failed");
        }
        let body = Json(json!({
            "ok": false,
            "error": self.public_message()
        }));
        (status, body).into_response()
    }
}

impl From<PersistenceError> for ApiError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::InvalidData(msg) => ApiError::BadRequest(msg),
            PersistenceError::Conflict { .. } => ApiError::Conflict(err.to_string()),
            _ => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NoUser => ApiError::BadRequest("no_user".to_string()),
            ServiceError::MissingInitData
            | ServiceError::InvalidInitData(_)
            | ServiceError::InitDataExpired => ApiError::Unauthorized("invalid_init_data".to_string()),
            ServiceError::UserNotFound(_) => ApiError::NotFound("User not found".to_string()),
            ServiceError::Persistence(e) => e.into(),
        }
    }
}

impl From<TelegramError> for ApiError {
    fn from(err: TelegramError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
