use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in aula-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the chat flow and the conversation cache.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The durable store was unreachable or rejected the operation.
    #[error("store error: {0}")]
    Store(#[from] RepositoryError),

    /// The inference step failed; passed through untouched.
    #[error("inference error: {0}")]
    Inference(#[from] LlmError),

    #[error("message cannot be empty")]
    EmptyMessage,

    /// `idempotency_response` was called without a prior successful
    /// `check_idempotency` for the same key.
    #[error("idempotency response requested for '{0}' without a cached exchange")]
    IdempotencyContract(String),
}
