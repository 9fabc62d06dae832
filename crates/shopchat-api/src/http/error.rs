//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use shopchat_types::error::{ExchangeError, StoreError};

use super::response::ApiResponse;

#[derive(Debug)]
pub enum AppError {
    Exchange(ExchangeError),
    /// No chat instance exists for this session yet.
    ChatNotFound(String),
    Validation(String),
}

impl From<ExchangeError> for AppError {
    fn from(e: ExchangeError) -> Self {
        AppError::Exchange(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Exchange(ExchangeError::MissingCredential) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MISSING_CREDENTIAL",
                "Completion API token is not configured".to_string(),
            ),
            AppError::Exchange(ExchangeError::Store(StoreError::DuplicateTempId(id))) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Temporary id '{id}' is already pending"),
            ),
            AppError::Exchange(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", e.to_string())
            }
            AppError::ChatNotFound(session_id) => (
                StatusCode::NOT_FOUND,
                "CHAT_NOT_FOUND",
                format!("No chat for session '{session_id}'"),
            ),
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            tracing::warn!(code, %message, "Request failed");
        }

        let request_id = uuid::Uuid::now_v7().to_string();
        let mut response = ApiResponse::error(code, &message, request_id).into_response();
        *response.status_mut() = status;
        response
    }
}
