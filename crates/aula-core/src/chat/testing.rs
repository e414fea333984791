//! In-memory store used by the chat tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use aula_types::chat::ChatTurn;
use aula_types::error::RepositoryError;
use aula_types::topic::Topic;

use super::repository::{ChatRepository, TopicRepository};

#[derive(Default)]
struct StoreState {
    turns: Vec<ChatTurn>,
    topics: HashMap<String, Topic>,
    prompts: HashMap<String, String>,
    reads: usize,
    fail_reads: bool,
    fail_writes: bool,
    read_delay: Option<Duration>,
}

/// Shared fake store: clones see the same state.
#[derive(Clone, Default)]
pub(crate) struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryStore {
    pub(crate) fn with_prompt(self, topic: &str, prompt: &str) -> Self {
        self.state()
            .prompts
            .insert(topic.to_string(), prompt.to_string());
        self
    }

    pub(crate) fn seed_turn(&self, turn: ChatTurn) {
        self.state().turns.push(turn);
    }

    pub(crate) fn turns(&self) -> Vec<ChatTurn> {
        self.state().turns.clone()
    }

    /// Number of `read_recent_turns` calls so far.
    pub(crate) fn reads(&self) -> usize {
        self.state().reads
    }

    pub(crate) fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    pub(crate) fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    pub(crate) fn set_read_delay(&self, delay: Duration) {
        self.state().read_delay = Some(delay);
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().expect("store lock poisoned")
    }
}

impl ChatRepository for InMemoryStore {
    async fn read_recent_turns(
        &self,
        user_id: &str,
        topic: &str,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        let delay = {
            let mut state = self.state();
            state.reads += 1;
            state.read_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state();
        if state.fail_reads {
            return Err(RepositoryError::Connection);
        }
        let matching: Vec<ChatTurn> = state
            .turns
            .iter()
            .filter(|t| t.user_id == user_id && t.topic == topic)
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn write_turn(&self, turn: &ChatTurn) -> Result<(), RepositoryError> {
        let mut state = self.state();
        if state.fail_writes {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        state.turns.push(turn.clone());
        Ok(())
    }

    async fn list_turns(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, RepositoryError> {
        let state = self.state();
        let matching: Vec<ChatTurn> = state
            .turns
            .iter()
            .filter(|t| user_id.is_none_or(|u| t.user_id == u))
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit);
        Ok(matching.into_iter().skip(skip).collect())
    }

    async fn count_turns(&self) -> Result<u64, RepositoryError> {
        Ok(self.state().turns.len() as u64)
    }

    async fn clear_all(&self) -> Result<(), RepositoryError> {
        self.state().turns.clear();
        Ok(())
    }
}

impl TopicRepository for InMemoryStore {
    async fn read_topic_prompt(&self, topic: &str) -> Result<String, RepositoryError> {
        let state = self.state();
        if state.fail_reads {
            return Err(RepositoryError::Connection);
        }
        if let Some(prompt) = state.prompts.get(topic) {
            return Ok(prompt.clone());
        }
        Ok(state.topics.get(topic).map(Topic::prompt).unwrap_or_default())
    }

    async fn create_topic(&self, topic: &Topic) -> Result<Topic, RepositoryError> {
        let mut state = self.state();
        if state.topics.contains_key(&topic.name) {
            return Err(RepositoryError::Conflict(topic.name.clone()));
        }
        state.topics.insert(topic.name.clone(), topic.clone());
        Ok(topic.clone())
    }

    async fn get_topic(&self, name: &str) -> Result<Option<Topic>, RepositoryError> {
        Ok(self.state().topics.get(name).cloned())
    }

    async fn list_topics(&self) -> Result<Vec<Topic>, RepositoryError> {
        let mut topics: Vec<Topic> = self.state().topics.values().cloned().collect();
        topics.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(topics)
    }

    async fn count_topics(&self) -> Result<u64, RepositoryError> {
        Ok(self.state().topics.len() as u64)
    }
}
