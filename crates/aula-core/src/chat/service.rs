//! Chat service orchestrating one inbound message end to end.
//!
//! ChatService coordinates the ChatMemoryManager and a ResponseGenerator:
//! resolve the conversation, short-circuit duplicates, build the bounded
//! context, generate, then persist and cache the turn.

use std::sync::Arc;

use aula_types::chat::{ChatReply, ChatTurn, ContextEntry, Sender};
use aula_types::error::{ChatError, RepositoryError};
use chrono::Utc;
use tracing::{debug, info};

use super::manager::ChatMemoryManager;
use super::repository::{ChatRepository, TopicRepository};
use crate::llm::generator::ResponseGenerator;

/// Handles chat messages for every (user, topic) pair.
///
/// Generic over the store traits and the generator so aula-core never
/// depends on aula-infra.
pub struct ChatService<C: ChatRepository, T: TopicRepository, G: ResponseGenerator> {
    memory: Arc<ChatMemoryManager<C, T>>,
    generator: G,
}

impl<C, T, G> ChatService<C, T, G>
where
    C: ChatRepository,
    T: TopicRepository,
    G: ResponseGenerator,
{
    pub fn new(memory: Arc<ChatMemoryManager<C, T>>, generator: G) -> Self {
        Self { memory, generator }
    }

    /// The shared conversation cache.
    pub fn memory(&self) -> &Arc<ChatMemoryManager<C, T>> {
        &self.memory
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Answer one message from `user_id` about `topic`.
    ///
    /// A repeat of the previous user message returns the cached reply with
    /// `cached: true` and does not call the generator or the store. A
    /// generator failure is returned as `ChatError::Inference` and leaves the
    /// conversation unchanged.
    pub async fn handle_message(
        &self,
        user_id: &str,
        topic: &str,
        message: &str,
    ) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let started = tokio::time::Instant::now();
        let conversation = self.memory.get_conversation(user_id, topic).await?;

        if self.memory.check_idempotency(user_id, topic, message) {
            let response = self.memory.idempotency_response(user_id, topic)?;
            debug!(user_id, topic, "Duplicate message, returning cached reply");
            return Ok(ChatReply {
                response,
                timestamp: Utc::now(),
                response_time_ms: started.elapsed().as_millis() as u64,
                cached: true,
            });
        }

        // The new message takes one slot of the context window.
        let history = self.memory.config().context_messages.saturating_sub(1);
        let mut context = conversation.context(history);
        context.push(ContextEntry {
            role: Sender::User.role().to_string(),
            content: message.to_string(),
        });

        let response = self.generator.generate(&context).await?;
        let elapsed = started.elapsed();

        let turn = self
            .memory
            .save_and_cache_message(user_id, topic, message, &response, elapsed)
            .await?;

        info!(
            user_id,
            topic,
            generator = self.generator.name(),
            response_time_ms = turn.response_time_ms,
            "Chat turn completed"
        );

        Ok(ChatReply {
            response: turn.response,
            timestamp: turn.created_at,
            response_time_ms: turn.response_time_ms,
            cached: false,
        })
    }

    /// Most recent stored turns, optionally for one user, oldest first.
    pub async fn history(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        self.memory.chat_repo().list_turns(user_id, limit).await
    }

    /// Delete all stored turns and drop every live conversation.
    pub async fn clear_history(&self) -> Result<(), RepositoryError> {
        self.memory.chat_repo().clear_all().await?;
        self.memory.clear();
        info!("Chat history cleared");
        Ok(())
    }
}
