//! ChatMemoryManager -- bounded directory of live conversations.
//!
//! Sits in front of the durable store and keeps at most `capacity`
//! conversations in memory, keyed by (user, topic):
//!
//! - hit: touch and return the live conversation, no store access;
//! - miss: hydrate the most recent turns from the store (or seed the topic
//!   prompt on a cold start), then admit it: sweep expired entries, evict
//!   the least recently active one if still full, insert.
//!
//! The directory map sits behind a std mutex held only for synchronous
//! critical sections. Cold starts for the same key are serialized by a
//! per-key async admission lock, so two concurrent misses can never install
//! divergent instances. Lock order is directory -> conversation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use aula_types::chat::{ChatTurn, ConversationKey, MemoryStats, Message, Sender};
use aula_types::config::MemoryConfig;
use aula_types::error::ChatError;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::conversation::{Conversation, ConversationHandle};
use super::repository::{ChatRepository, TopicRepository};

type AdmissionLock = Arc<tokio::sync::Mutex<()>>;

/// A directory entry: the live conversation and its admission order.
struct Slot {
    conversation: ConversationHandle,
    /// Tie-break for equal `last_activity`: earlier admissions go first.
    admitted: u64,
}

#[derive(Default)]
struct Directory {
    entries: HashMap<ConversationKey, Slot>,
    next_seq: u64,
}

impl Directory {
    fn insert(&mut self, key: ConversationKey, conversation: ConversationHandle) {
        let admitted = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            Slot {
                conversation,
                admitted,
            },
        );
    }

    /// Remove every entry idle longer than `timeout`; returns the removed keys.
    fn sweep(&mut self, now: Instant, timeout: Duration) -> Vec<ConversationKey> {
        let expired: Vec<ConversationKey> = self
            .entries
            .iter()
            .filter(|(_, slot)| slot.conversation.is_expired_at(now, timeout))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
        }
        expired
    }

    /// Remove the least recently active entry.
    fn evict_oldest(&mut self) -> Option<ConversationKey> {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, slot)| (slot.conversation.last_activity(), slot.admitted))
            .map(|(key, _)| key.clone())?;

        self.entries.remove(&oldest);
        Some(oldest)
    }
}

/// Holds a per-key admission lock and drops the table entry once unused.
struct AdmissionTicket<'a> {
    table: &'a DashMap<ConversationKey, AdmissionLock>,
    key: ConversationKey,
    lock: AdmissionLock,
}

impl Drop for AdmissionTicket<'_> {
    fn drop(&mut self) {
        // Two references left means only the table and this ticket hold it.
        self.table.remove_if(&self.key, |_, lock| {
            Arc::ptr_eq(lock, &self.lock) && Arc::strong_count(lock) <= 2
        });
    }
}

/// In-process cache of recent dialogue in front of the durable store.
///
/// Generic over `ChatRepository` and `TopicRepository` so aula-core never
/// depends on aula-infra. Construct one per process and share it by `Arc`.
pub struct ChatMemoryManager<C: ChatRepository, T: TopicRepository> {
    chat_repo: C,
    topic_repo: T,
    config: MemoryConfig,
    directory: Mutex<Directory>,
    admissions: DashMap<ConversationKey, AdmissionLock>,
}

impl<C: ChatRepository, T: TopicRepository> ChatMemoryManager<C, T> {
    /// Create a manager with the given store and cache sizing.
    ///
    /// `window_size` and `capacity` are floored at 1.
    pub fn new(chat_repo: C, topic_repo: T, mut config: MemoryConfig) -> Self {
        config.window_size = config.window_size.max(1);
        config.capacity = config.capacity.max(1);

        Self {
            chat_repo,
            topic_repo,
            config,
            directory: Mutex::new(Directory::default()),
            admissions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    pub fn chat_repo(&self) -> &C {
        &self.chat_repo
    }

    pub fn topic_repo(&self) -> &T {
        &self.topic_repo
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    fn directory(&self) -> MutexGuard<'_, Directory> {
        self.directory.lock().expect("conversation directory lock poisoned")
    }

    // --- Lookup and hydration ---

    /// Resolve the live conversation for (user, topic), hydrating it from the
    /// durable store on a miss.
    ///
    /// A store failure is returned as `ChatError::Store`; the manager never
    /// substitutes an empty conversation for an unreachable store.
    pub async fn get_conversation(
        &self,
        user_id: &str,
        topic: &str,
    ) -> Result<ConversationHandle, ChatError> {
        let key = ConversationKey::new(user_id, topic);
        if let Some(handle) = self.lookup(&key, true) {
            return Ok(handle);
        }

        let ticket = self.admission_ticket(&key);
        let _admission = ticket.lock.lock().await;

        // Another caller may have installed it while we waited.
        if let Some(handle) = self.lookup(&key, true) {
            return Ok(handle);
        }

        let conversation = self.hydrate(&key).await?;
        Ok(self.add_to_memory(conversation))
    }

    /// Drop the live conversation (if any) and hydrate it again from the store.
    pub async fn force_reload(
        &self,
        user_id: &str,
        topic: &str,
    ) -> Result<ConversationHandle, ChatError> {
        self.evict(user_id, topic);
        self.get_conversation(user_id, topic).await
    }

    fn lookup(&self, key: &ConversationKey, touch: bool) -> Option<ConversationHandle> {
        let directory = self.directory();
        let slot = directory.entries.get(key)?;
        if touch {
            slot.conversation.touch();
        }
        Some(slot.conversation.clone())
    }

    fn admission_ticket(&self, key: &ConversationKey) -> AdmissionTicket<'_> {
        let lock = self.admissions.entry(key.clone()).or_default().clone();
        AdmissionTicket {
            table: &self.admissions,
            key: key.clone(),
            lock,
        }
    }

    async fn hydrate(&self, key: &ConversationKey) -> Result<Conversation, ChatError> {
        let turns = self
            .chat_repo
            .read_recent_turns(&key.user_id, &key.topic, self.config.window_size)
            .await?;

        let messages: Vec<Message> = if turns.is_empty() {
            let prompt = self.topic_repo.read_topic_prompt(&key.topic).await?;
            if prompt.is_empty() {
                Vec::new()
            } else {
                vec![Message::new(prompt, Sender::System)]
            }
        } else {
            turns.iter().flat_map(ChatTurn::to_messages).collect()
        };

        debug!(
            user_id = %key.user_id,
            topic = %key.topic,
            turns = turns.len(),
            messages = messages.len(),
            "Hydrated conversation from store"
        );

        Ok(Conversation::with_messages(
            key.clone(),
            self.config.window_size,
            messages,
        ))
    }

    /// Admit a conversation: sweep expired entries, evict the least recently
    /// active one if still at capacity, then insert.
    fn add_to_memory(&self, conversation: Conversation) -> ConversationHandle {
        let key = conversation.key().clone();
        let handle = ConversationHandle::new(conversation);

        let mut directory = self.directory();
        let expired = directory.sweep(Instant::now(), self.timeout());

        let evicted = if directory.entries.len() >= self.config.capacity
            && !directory.entries.contains_key(&key)
        {
            directory.evict_oldest()
        } else {
            None
        };

        directory.insert(key.clone(), handle.clone());
        let active = directory.entries.len();
        drop(directory);

        if !expired.is_empty() {
            debug!(expired = expired.len(), "Swept expired conversations");
        }
        if let Some(evicted) = evicted {
            info!(evicted = %evicted, "Evicted least recently active conversation");
        }
        debug!(key = %key, active, "Conversation admitted to memory");

        handle
    }

    // --- Idempotency ---

    /// Whether `message` repeats the user turn of the last cached exchange.
    ///
    /// Compares the second-to-last entry of the current context verbatim.
    /// Returns false when the key is not live or has fewer than two entries.
    /// Never touches the durable store.
    pub fn check_idempotency(&self, user_id: &str, topic: &str, message: &str) -> bool {
        let key = ConversationKey::new(user_id, topic);
        let Some(handle) = self.lookup(&key, false) else {
            return false;
        };

        handle.with(|conversation| {
            let context = conversation.get_context(self.config.context_messages);
            context.len() >= 2 && context[context.len() - 2].content == message
        })
    }

    /// The cached answer for a duplicate request: the last context entry.
    ///
    /// Only valid after `check_idempotency` returned true for the same key.
    /// Violating that contract asserts in debug builds and returns
    /// `ChatError::IdempotencyContract` otherwise.
    pub fn idempotency_response(&self, user_id: &str, topic: &str) -> Result<String, ChatError> {
        let key = ConversationKey::new(user_id, topic);
        let response = self.lookup(&key, false).and_then(|handle| {
            handle.with(|conversation| {
                let context = conversation.get_context(self.config.context_messages);
                if context.len() >= 2 {
                    context.last().map(|entry| entry.content.clone())
                } else {
                    None
                }
            })
        });

        debug_assert!(
            response.is_some(),
            "idempotency_response called for '{key}' without a cached exchange"
        );
        response.ok_or_else(|| ChatError::IdempotencyContract(key.to_string()))
    }

    // --- Persistence ---

    /// Persist a completed turn, then record it in the live conversation.
    ///
    /// The durable write happens first; if it fails the error is returned
    /// and memory is left untouched. If the conversation is no longer live
    /// (e.g. evicted meanwhile) the miss is logged and the call still
    /// succeeds, since the store already holds the turn.
    pub async fn save_and_cache_message(
        &self,
        user_id: &str,
        topic: &str,
        message: &str,
        response: &str,
        elapsed: Duration,
    ) -> Result<ChatTurn, ChatError> {
        let turn = ChatTurn::new(
            user_id,
            topic,
            message,
            response,
            elapsed.as_millis() as u64,
        );
        self.chat_repo.write_turn(&turn).await?;

        let key = ConversationKey::new(user_id, topic);
        match self.lookup(&key, false) {
            Some(handle) => handle.with(|conversation| {
                conversation.append(turn.message.clone(), Sender::User);
                conversation.append(turn.response.clone(), Sender::Bot);
            }),
            None => warn!(
                user_id,
                topic, "Conversation not in memory after save, cache update skipped"
            ),
        }

        Ok(turn)
    }

    // --- Maintenance and stats ---

    /// Remove every conversation idle longer than the timeout.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.directory().sweep(Instant::now(), self.timeout());
        if !removed.is_empty() {
            debug!(expired = removed.len(), "Swept expired conversations");
        }
        removed.len()
    }

    /// Drop one conversation from memory. Returns whether it was live.
    pub fn evict(&self, user_id: &str, topic: &str) -> bool {
        let key = ConversationKey::new(user_id, topic);
        self.directory().entries.remove(&key).is_some()
    }

    /// Drop every live conversation.
    pub fn clear(&self) {
        self.directory().entries.clear();
    }

    pub fn contains(&self, user_id: &str, topic: &str) -> bool {
        let key = ConversationKey::new(user_id, topic);
        self.directory().entries.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.directory().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get_memory_stats(&self) -> MemoryStats {
        let active = self.len();
        MemoryStats {
            active_count: active,
            capacity: self.config.capacity,
            timeout_seconds: self.config.timeout_secs,
            utilization_percent: active as f64 / self.config.capacity as f64 * 100.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::InMemoryStore;

    fn config(window_size: usize, capacity: usize, timeout_secs: u64) -> MemoryConfig {
        MemoryConfig {
            window_size,
            capacity,
            timeout_secs,
            ..MemoryConfig::default()
        }
    }

    fn manager(
        store: &InMemoryStore,
        config: MemoryConfig,
    ) -> ChatMemoryManager<InMemoryStore, InMemoryStore> {
        ChatMemoryManager::new(store.clone(), store.clone(), config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_hit_does_not_touch_store() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 2, 1800));

        let first = manager.get_conversation("u1", "t1").await.unwrap();
        assert_eq!(store.reads(), 1);

        let second = manager.get_conversation("u1", "t1").await.unwrap();
        assert_eq!(store.reads(), 1);
        assert!(first.ptr_eq(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_least_recently_active() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 2, 1800));

        manager.get_conversation("a", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;
        manager.get_conversation("b", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        // Both served from cache; touching A makes B the older one.
        manager.get_conversation("a", "t").await.unwrap();
        manager.get_conversation("b", "t").await.unwrap();
        assert_eq!(store.reads(), 2);

        tokio::time::advance(Duration::from_secs(10)).await;
        manager.get_conversation("a", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(10)).await;

        manager.get_conversation("c", "t").await.unwrap();
        assert_eq!(manager.len(), 2);
        assert!(manager.contains("a", "t"));
        assert!(!manager.contains("b", "t"));
        assert!(manager.contains("c", "t"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_directory_never_exceeds_capacity() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 3, 1800));

        for i in 0..20 {
            manager
                .get_conversation(&format!("user{i}"), "topic")
                .await
                .unwrap();
            assert!(manager.len() <= 3);
            tokio::time::advance(Duration::from_secs(1)).await;
        }
        assert_eq!(manager.len(), 3);
        // The three most recent arrivals survive.
        for i in 17..20 {
            assert!(manager.contains(&format!("user{i}"), "topic"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_equal_activity_evicts_earliest_admitted() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 2, 1800));

        manager.get_conversation("first", "t").await.unwrap();
        manager.get_conversation("second", "t").await.unwrap();
        manager.get_conversation("third", "t").await.unwrap();

        assert!(!manager.contains("first", "t"));
        assert!(manager.contains("second", "t"));
        assert!(manager.contains("third", "t"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_removes_exactly_expired() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 100));

        manager.get_conversation("old1", "t").await.unwrap();
        manager.get_conversation("old2", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;
        manager.get_conversation("fresh", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(41)).await;

        // old1/old2 idle 101s, fresh idle 41s.
        assert_eq!(manager.sweep_expired(), 2);
        assert_eq!(manager.len(), 1);
        assert!(manager.contains("fresh", "t"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_sweeps_before_evicting() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 2, 100));

        manager.get_conversation("stale", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(50)).await;
        manager.get_conversation("live", "t").await.unwrap();
        tokio::time::advance(Duration::from_secs(60)).await;

        // "stale" is expired and swept; "live" survives even though full.
        manager.get_conversation("new", "t").await.unwrap();
        assert!(!manager.contains("stale", "t"));
        assert!(manager.contains("live", "t"));
        assert!(manager.contains("new", "t"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hydration_expands_turns_and_truncates() {
        let store = InMemoryStore::default();
        for i in 0..15 {
            store.seed_turn(ChatTurn::new("u1", "t1", format!("q{i}"), format!("a{i}"), 10));
        }
        let manager = manager(&store, config(20, 10, 1800));

        let handle = manager.get_conversation("u1", "t1").await.unwrap();
        assert_eq!(handle.len(), 20);

        let context = handle.context(4);
        let contents: Vec<&str> = context.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["q13", "a13", "q14", "a14"]);
        assert_eq!(context[0].role, "user");
        assert_eq!(context[1].role, "assistant");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_seeds_topic_prompt() {
        let store = InMemoryStore::default().with_prompt("t2", "Welcome to Topic 2");
        let manager = manager(&store, config(20, 10, 1800));

        let handle = manager.get_conversation("u2", "t2").await.unwrap();
        let context = handle.context(10);
        assert_eq!(context.len(), 1);
        assert_eq!(context[0].role, "system");
        assert_eq!(context[0].content, "Welcome to Topic 2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cold_start_unregistered_topic_is_empty() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 1800));

        let handle = manager.get_conversation("u2", "unknown").await.unwrap();
        assert!(handle.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_is_not_an_empty_conversation() {
        let store = InMemoryStore::default();
        store.set_fail_reads(true);
        let manager = manager(&store, config(20, 10, 1800));

        let result = manager.get_conversation("u1", "t1").await;
        assert!(matches!(result, Err(ChatError::Store(_))));
        assert!(manager.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_cold_starts_share_one_instance() {
        let store = InMemoryStore::default();
        store.set_read_delay(Duration::from_millis(50));
        let manager = Arc::new(manager(&store, config(20, 10, 1800)));

        let tasks: Vec<_> = (0..5)
            .map(|_| {
                let manager = Arc::clone(&manager);
                tokio::spawn(async move { manager.get_conversation("u1", "t1").await.unwrap() })
            })
            .collect();

        let mut handles = Vec::new();
        for task in tasks {
            handles.push(task.await.unwrap());
        }

        assert_eq!(store.reads(), 1, "only one hydration should reach the store");
        assert!(handles.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
        assert!(manager.admissions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_hydration_lets_waiter_install() {
        let store = InMemoryStore::default();
        store.set_read_delay(Duration::from_millis(100));
        let manager = Arc::new(manager(&store, config(20, 10, 1800)));

        let first = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_conversation("u1", "t1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.reads(), 1, "first caller is mid-hydration");

        let second = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_conversation("u1", "t1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.reads(), 1, "second caller waits on the admission lock");

        first.abort();
        assert!(!manager.contains("u1", "t1"));
        assert!(first.await.unwrap_err().is_cancelled());

        let handle = second.await.unwrap().unwrap();
        assert_eq!(store.reads(), 2, "the waiter hydrates for itself");
        assert!(manager.contains("u1", "t1"));
        assert_eq!(manager.len(), 1);
        assert!(handle.is_empty());
        assert!(manager.admissions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_hydrate_independently() {
        let store = InMemoryStore::default();
        store.set_read_delay(Duration::from_secs(3600));
        let manager = Arc::new(manager(&store, config(20, 10, 1800)));

        let stalled = {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.get_conversation("slow", "t1").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.reads(), 1);

        // Only the read already in flight keeps the long delay.
        store.set_read_delay(Duration::ZERO);
        let other = tokio::time::timeout(
            Duration::from_secs(1),
            manager.get_conversation("fast", "t1"),
        )
        .await
        .expect("a miss on another key must not wait for the stalled one")
        .unwrap();

        assert!(other.is_empty());
        assert!(manager.contains("fast", "t1"));
        assert!(!manager.contains("slow", "t1"));

        stalled.abort();
        let _ = stalled.await;
        assert!(manager.admissions.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idempotency_detects_repeated_message() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 1800));

        manager.get_conversation("u1", "t1").await.unwrap();
        manager
            .save_and_cache_message("u1", "t1", "hello", "Hi! How can I help?", Duration::from_millis(5))
            .await
            .unwrap();

        assert!(manager.check_idempotency("u1", "t1", "hello"));
        assert!(!manager.check_idempotency("u1", "t1", "hello again"));
        assert_eq!(
            manager.idempotency_response("u1", "t1").unwrap(),
            "Hi! How can I help?"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_idempotency_without_enough_state() {
        let store = InMemoryStore::default().with_prompt("t1", "prompt");
        let manager = manager(&store, config(20, 10, 1800));

        // Not live at all
        assert!(!manager.check_idempotency("u1", "t1", "prompt"));

        // Live with a single system entry
        manager.get_conversation("u1", "t1").await.unwrap();
        assert!(!manager.check_idempotency("u1", "t1", "prompt"));
    }

    #[cfg(debug_assertions)]
    #[tokio::test]
    #[should_panic(expected = "without a cached exchange")]
    async fn test_idempotency_response_contract_asserts() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 1800));
        let _ = manager.idempotency_response("nobody", "t1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_writes_store_before_memory() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 1800));
        let handle = manager.get_conversation("u1", "t1").await.unwrap();

        store.set_fail_writes(true);
        let result = manager
            .save_and_cache_message("u1", "t1", "q", "a", Duration::ZERO)
            .await;
        assert!(matches!(result, Err(ChatError::Store(_))));
        assert!(handle.is_empty(), "memory must not change when the write fails");

        store.set_fail_writes(false);
        let turn = manager
            .save_and_cache_message("u1", "t1", "q", "a", Duration::from_millis(42))
            .await
            .unwrap();
        assert_eq!(turn.response_time_ms, 42);
        assert_eq!(store.turns().len(), 1);
        assert_eq!(handle.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_without_live_conversation_still_succeeds() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 1800));

        let turn = manager
            .save_and_cache_message("u1", "t1", "q", "a", Duration::ZERO)
            .await
            .unwrap();
        assert_eq!(turn.message, "q");
        assert_eq!(store.turns().len(), 1);
        assert!(!manager.contains("u1", "t1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_reload_rehydrates() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 10, 1800));

        let before = manager.get_conversation("u1", "t1").await.unwrap();
        store.seed_turn(ChatTurn::new("u1", "t1", "q", "a", 1));

        let after = manager.force_reload("u1", "t1").await.unwrap();
        assert!(!before.ptr_eq(&after));
        assert_eq!(after.len(), 2);
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_stats() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 4, 1800));

        manager.get_conversation("a", "t").await.unwrap();
        let stats = manager.get_memory_stats();
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.capacity, 4);
        assert_eq!(stats.timeout_seconds, 1800);
        assert!((stats.utilization_percent - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_handle_remains_usable() {
        let store = InMemoryStore::default();
        let manager = manager(&store, config(20, 1, 1800));

        let handle = manager.get_conversation("a", "t").await.unwrap();
        manager.get_conversation("b", "t").await.unwrap();
        assert!(!manager.contains("a", "t"));

        // An in-flight holder keeps working on its own instance.
        handle.append("late write", Sender::User);
        assert_eq!(handle.len(), 1);
    }
}
