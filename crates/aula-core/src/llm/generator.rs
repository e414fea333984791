//! ResponseGenerator trait definition.

use aula_types::chat::ContextEntry;
use aula_types::llm::LlmError;

/// Trait for inference backends that turn a bounded context into a reply.
///
/// The context is ordered oldest first and ends with the user's new
/// message. Implementations pass through whatever text or failure the
/// backend produces; callers never retry.
///
/// Implementations live in aula-infra (e.g., `HuggingFaceGenerator`) and in
/// this module's fallbacks.
pub trait ResponseGenerator: Send + Sync {
    /// Human-readable generator name (e.g., "huggingface", "keyword").
    fn name(&self) -> &str;

    /// Produce a reply for the given context.
    fn generate(
        &self,
        context: &[ContextEntry],
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}

/// The content of the most recent `user` entry, if any.
pub fn last_user_message(context: &[ContextEntry]) -> Option<&str> {
    context
        .iter()
        .rev()
        .find(|entry| entry.role == "user")
        .map(|entry| entry.content.as_str())
}
