//! Application error type mapping to HTTP status codes and envelope format.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use aula_types::error::{ChatError, RepositoryError};
use aula_types::llm::LlmError;

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Chat(ChatError),
    Repository(RepositoryError),
    NotFound(String),
    Validation(String),
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        AppError::Repository(e)
    }
}

fn repository_status(e: &RepositoryError) -> (StatusCode, &'static str) {
    match e {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        RepositoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
        RepositoryError::Connection => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
        RepositoryError::Query(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
    }
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Chat(ChatError::EmptyMessage) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Chat(ChatError::Store(e)) | AppError::Repository(e) => repository_status(e),
            AppError::Chat(ChatError::Inference(LlmError::Timeout)) => {
                (StatusCode::GATEWAY_TIMEOUT, "INFERENCE_TIMEOUT")
            }
            AppError::Chat(ChatError::Inference(LlmError::RateLimited { .. })) => {
                (StatusCode::TOO_MANY_REQUESTS, "INFERENCE_RATE_LIMITED")
            }
            AppError::Chat(ChatError::Inference(_)) => (StatusCode::BAD_GATEWAY, "INFERENCE_ERROR"),
            AppError::Chat(ChatError::IdempotencyContract(_)) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Chat(e) => e.to_string(),
            AppError::Repository(e) => e.to_string(),
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::Internal(msg) => {
                msg.clone()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!(%status, code, %message, "Request failed");
        }

        let envelope = ApiResponse::error(code, &message, uuid::Uuid::now_v7().to_string());
        let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Chat(ChatError::EmptyMessage), StatusCode::BAD_REQUEST),
            (
                AppError::Chat(ChatError::Store(RepositoryError::Connection)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                AppError::Chat(ChatError::Inference(LlmError::Timeout)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::Chat(ChatError::Inference(LlmError::AuthenticationFailed)),
                StatusCode::BAD_GATEWAY,
            ),
            (
                AppError::Repository(RepositoryError::Conflict("t1".to_string())),
                StatusCode::CONFLICT,
            ),
            (AppError::NotFound("user".to_string()), StatusCode::NOT_FOUND),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status().0, expected, "{error:?}");
        }
    }

    #[test]
    fn test_into_response_status() {
        let response = AppError::Validation("user_id is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
