//! Chat message, turn, and cache statistics types for Aula.
//!
//! A `Message` is one line of dialogue held in the in-memory conversation
//! window. A `ChatTurn` is the durable record of one exchange (the user's
//! message plus the bot's response) as stored in the database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    System,
}

impl Sender {
    /// Role name handed to the inference endpoint.
    ///
    /// Bot messages are presented as `assistant`; every other sender keeps
    /// its own tag so topic prompts survive as `system` entries.
    pub fn role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "assistant",
            Sender::System => "system",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
            Sender::System => write!(f, "system"),
        }
    }
}

impl FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Sender::User),
            "bot" => Ok(Sender::Bot),
            "system" => Ok(Sender::System),
            other => Err(format!("invalid sender: '{other}'")),
        }
    }
}

/// A single immutable line of dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time.
    pub fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self::at(content, sender, Utc::now())
    }

    /// Create a message with an explicit timestamp (used when hydrating
    /// from stored turns).
    pub fn at(content: impl Into<String>, sender: Sender, timestamp: DateTime<Utc>) -> Self {
        Self {
            content: content.into(),
            sender,
            timestamp,
        }
    }
}

/// One `{role, content}` pair of the context handed to inference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEntry {
    pub role: String,
    pub content: String,
}

impl From<&Message> for ContextEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.sender.role().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Directory key of a live conversation: one per (user, topic) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationKey {
    pub user_id: String,
    pub topic: String,
}

impl ConversationKey {
    pub fn new(user_id: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            topic: topic.into(),
        }
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.topic)
    }
}

/// Durable record of one exchange between a user and the bot.
///
/// Turns are ordered by `created_at` within a (user, topic) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub user_id: String,
    pub topic: String,
    /// The user's message.
    pub message: String,
    /// The bot's reply.
    pub response: String,
    /// Time spent producing the reply, in milliseconds.
    pub response_time_ms: u64,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    /// Build a new turn stamped now with a fresh time-sortable id.
    pub fn new(
        user_id: impl Into<String>,
        topic: impl Into<String>,
        message: impl Into<String>,
        response: impl Into<String>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            user_id: user_id.into(),
            topic: topic.into(),
            message: message.into(),
            response: response.into(),
            response_time_ms,
            created_at: Utc::now(),
        }
    }

    /// Expand the turn into the two window messages it represents:
    /// the user's message followed by the bot's reply.
    pub fn to_messages(&self) -> [Message; 2] {
        [
            Message::at(self.message.clone(), Sender::User, self.created_at),
            Message::at(self.response.clone(), Sender::Bot, self.created_at),
        ]
    }
}

/// Snapshot of the conversation cache's occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Live conversations currently held.
    pub active_count: usize,
    pub capacity: usize,
    pub timeout_seconds: u64,
    pub utilization_percent: f64,
}

/// Reply returned to a client for one inbound chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: DateTime<Utc>,
    pub response_time_ms: u64,
    /// True when the reply was served from the cache as a duplicate request.
    pub cached: bool,
}

/// Aggregate counts over the durable store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatStats {
    pub total_turns: u64,
    pub total_users: u64,
    pub total_topics: u64,
}
