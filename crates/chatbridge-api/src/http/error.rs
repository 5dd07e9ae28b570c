//! Application error type mapping to HTTP status codes and envelope format.

use axum::response::{IntoResponse, Response};

use chatbridge_infra::webhook::WebhookError;

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Webhook authentication failure.
    Unauthorized(String),
    /// Malformed request body.
    Validation(String),
    /// No live session for the chat id.
    SessionNotFound(String),
    /// The event pipeline no longer accepts work.
    ShuttingDown,
}

impl From<WebhookError> for AppError {
    fn from(e: WebhookError) -> Self {
        AppError::Unauthorized(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (code, message) = match &self {
            AppError::Unauthorized(msg) => ("UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::SessionNotFound(chat_id) => (
                "SESSION_NOT_FOUND",
                format!("No live session for chat '{chat_id}'"),
            ),
            AppError::ShuttingDown => (
                "SHUTTING_DOWN",
                "Server is shutting down and no longer accepts events".to_string(),
            ),
        };

        ApiResponse::<()>::error(code, &message, String::new(), 0).into_response()
    }
}
