//! Per-(user, topic) conversation window.
//!
//! A `Conversation` keeps the most recent `window_size` messages of one
//! dialogue and a memoized view of the context handed to inference. Every
//! append bumps a generation counter; a memoized context is only returned
//! when it was built at the current generation, so a read after a write
//! always recomputes.
//!
//! All operations are synchronous. Shared access goes through
//! [`ConversationHandle`], which serializes callers on a short std mutex.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use aula_types::chat::{ContextEntry, ConversationKey, Message, Sender};
use tokio::time::Instant;

/// Default number of messages kept per conversation.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// A memoized context and the generation it was built at.
#[derive(Debug)]
struct MemoEntry {
    generation: u64,
    context: Vec<ContextEntry>,
}

/// Sliding window of recent messages for one (user, topic) pair.
#[derive(Debug)]
pub struct Conversation {
    key: ConversationKey,
    window: VecDeque<Message>,
    window_size: usize,
    last_activity: Instant,
    /// Bumped on every append; memo entries from older generations are stale.
    generation: u64,
    memo: HashMap<usize, MemoEntry>,
}

impl Conversation {
    /// Create an empty conversation.
    pub fn new(key: ConversationKey, window_size: usize) -> Self {
        Self::with_messages(key, window_size, Vec::new())
    }

    /// Create a conversation seeded with existing messages (oldest first).
    ///
    /// Only the most recent `window_size` messages are kept.
    pub fn with_messages(
        key: ConversationKey,
        window_size: usize,
        messages: impl IntoIterator<Item = Message>,
    ) -> Self {
        let window_size = window_size.max(1);
        let mut window: VecDeque<Message> = messages.into_iter().collect();
        while window.len() > window_size {
            window.pop_front();
        }

        Self {
            key,
            window,
            window_size,
            last_activity: Instant::now(),
            generation: 0,
            memo: HashMap::new(),
        }
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Messages in the window, oldest first.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.window.iter()
    }

    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Mark the conversation as active now without changing its content.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Append a message stamped now and drop the oldest beyond the window.
    pub fn append(&mut self, content: impl Into<String>, sender: Sender) {
        self.window.push_back(Message::new(content, sender));
        self.generation = self.generation.wrapping_add(1);
        self.last_activity = Instant::now();

        while self.window.len() > self.window_size {
            self.window.pop_front();
        }
    }

    /// The most recent `min(max_messages, len)` messages as `{role, content}`.
    ///
    /// Memoized per `max_messages` until the next append. Returns an empty
    /// slice when the window is empty or `max_messages` is zero.
    pub fn get_context(&mut self, max_messages: usize) -> &[ContextEntry] {
        let generation = self.generation;
        let stale = self
            .memo
            .get(&max_messages)
            .is_none_or(|entry| entry.generation != generation);

        if stale {
            let skip = self.window.len().saturating_sub(max_messages);
            let context = self.window.iter().skip(skip).map(ContextEntry::from).collect();
            self.memo
                .insert(max_messages, MemoEntry { generation, context });
        }

        self.memo
            .get(&max_messages)
            .map(|entry| entry.context.as_slice())
            .unwrap_or_default()
    }

    /// Whether the conversation has been idle longer than `timeout`.
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.is_expired_at(Instant::now(), timeout)
    }

    /// Clock-injected form of [`is_expired`](Self::is_expired).
    pub fn is_expired_at(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) > timeout
    }
}

/// Shared, lockable reference to a live conversation.
///
/// Cloning yields another handle to the same conversation. The directory in
/// `ChatMemoryManager` holds one handle per key; removing it from the
/// directory never invalidates handles held by in-flight requests.
#[derive(Debug, Clone)]
pub struct ConversationHandle {
    key: ConversationKey,
    inner: Arc<Mutex<Conversation>>,
}

impl ConversationHandle {
    pub fn new(conversation: Conversation) -> Self {
        Self {
            key: conversation.key().clone(),
            inner: Arc::new(Mutex::new(conversation)),
        }
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    /// Run `f` with exclusive access to the conversation.
    pub fn with<R>(&self, f: impl FnOnce(&mut Conversation) -> R) -> R {
        f(&mut self.lock())
    }

    /// Owned copy of the current context (see [`Conversation::get_context`]).
    pub fn context(&self, max_messages: usize) -> Vec<ContextEntry> {
        self.lock().get_context(max_messages).to_vec()
    }

    pub fn append(&self, content: impl Into<String>, sender: Sender) {
        self.lock().append(content, sender);
    }

    pub fn touch(&self) {
        self.lock().touch();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn last_activity(&self) -> Instant {
        self.lock().last_activity()
    }

    pub fn is_expired_at(&self, now: Instant, timeout: Duration) -> bool {
        self.lock().is_expired_at(now, timeout)
    }

    /// Whether both handles point at the same conversation instance.
    pub fn ptr_eq(&self, other: &ConversationHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.inner.lock().expect("conversation lock poisoned")
    }
}
