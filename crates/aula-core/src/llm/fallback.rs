//! Canned replies for when the model is unreachable.
//!
//! `KeywordResponder` matches keywords in the latest user message.
//! `WithFallback` routes to a primary generator and answers from a
//! secondary one when the primary fails.

use aula_types::chat::ContextEntry;
use aula_types::llm::LlmError;
use tracing::warn;

use super::generator::{ResponseGenerator, last_user_message};

const KEYWORD_REPLIES: &[(&[&str], &str)] = &[
    (
        &["hello", "hi", "hey"],
        "Hello! I'm having trouble connecting to my AI brain right now, but I'm here to chat!",
    ),
    (
        &["how are you", "how's it going"],
        "I'm doing well, thanks! Though I should mention I'm running on backup responses right now.",
    ),
    (
        &["bye", "goodbye", "see you"],
        "Goodbye! Hope to chat with you again soon!",
    ),
    (
        &["help"],
        "I'm here to help! I'm currently running on simple responses, but I can still try to assist you.",
    ),
];

const DEFAULT_REPLY: &str = "That's interesting! I'm currently having trouble with my main AI system, but I'm still here to chat with you.";

/// Deterministic replies keyed on substrings of the user's message.
///
/// Groups are checked in order; the first group with any keyword contained
/// in the lowercased message wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordResponder;

impl KeywordResponder {
    pub fn reply_to(&self, message: &str) -> &'static str {
        let message = message.trim().to_lowercase();
        KEYWORD_REPLIES
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
            .map(|(_, reply)| *reply)
            .unwrap_or(DEFAULT_REPLY)
    }
}

impl ResponseGenerator for KeywordResponder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn generate(&self, context: &[ContextEntry]) -> Result<String, LlmError> {
        let message = last_user_message(context).unwrap_or_default();
        Ok(self.reply_to(message).to_string())
    }
}

/// Primary generator with a secondary one for failures.
///
/// Authentication failures are not masked: a misconfigured token should be
/// visible to the operator rather than answered with canned text.
pub struct WithFallback<P, F> {
    primary: P,
    fallback: F,
}

impl<P: ResponseGenerator, F: ResponseGenerator> WithFallback<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: ResponseGenerator, F: ResponseGenerator> ResponseGenerator for WithFallback<P, F> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    async fn generate(&self, context: &[ContextEntry]) -> Result<String, LlmError> {
        match self.primary.generate(context).await {
            Ok(reply) => Ok(reply),
            Err(LlmError::AuthenticationFailed) => Err(LlmError::AuthenticationFailed),
            Err(e) => {
                warn!(
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Generator failed, answering from fallback"
                );
                self.fallback.generate(context).await
            }
        }
    }
}
