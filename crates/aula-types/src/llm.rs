//! Inference error type.
//!
//! The inference step is a black box to the conversation cache: it receives
//! the bounded context and returns either text or one of these errors.

use thiserror::Error;

/// Errors from the language-model inference step.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("request timed out (the model might be loading)")]
    Timeout,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_display() {
        let err = LlmError::RateLimited {
            retry_after_ms: Some(500),
        };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_provider_display() {
        let err = LlmError::Provider {
            message: "HTTP 503".to_string(),
        };
        assert_eq!(err.to_string(), "provider error: HTTP 503");
    }
}
