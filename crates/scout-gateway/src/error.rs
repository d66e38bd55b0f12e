use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use scout_core::ScoutError;
use tracing::error;

/// A JSON error response: `{"error": message}` with a status code.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status sent.
    pub status: StatusCode,
    /// Text of the `error` field.
    pub message: String,
}

impl ApiError {
    /// Error with any status.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 404 `Session not found`.
    pub fn session_not_found() -> Self {
        Self::not_found("Session not found")
    }
}

impl From<ScoutError> for ApiError {
    fn from(e: ScoutError) -> Self {
        error!(error = %e, "Request failed");
        Self::internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "error": self.message }));
        (self.status, body).into_response()
    }
}

/// Handler result.
pub type ApiResult<T> = Result<T, ApiError>;
