//! Topic registry types.
//!
//! A topic is a instructor-authored assignment that grounds the model on a
//! cold start: its prompt is injected as a `system` message when a student
//! opens a conversation with no prior history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique name; also the `topic` half of a conversation key.
    pub name: String,
    /// Subject area (e.g. "math", "history").
    pub subject: String,
    /// Instructions for the model.
    pub instructions: String,
    /// Reference material appended after the instructions.
    #[serde(default)]
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Topic {
    /// The instructional prompt seeded into cold-start conversations.
    pub fn prompt(&self) -> String {
        if self.content.is_empty() {
            self.instructions.clone()
        } else {
            format!("{}\n\n{}", self.instructions, self.content)
        }
    }
}

/// Request payload for registering a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTopic {
    pub name: String,
    pub subject: String,
    pub instructions: String,
    #[serde(default)]
    pub content: String,
}

impl NewTopic {
    pub fn into_topic(self) -> Topic {
        Topic {
            name: self.name,
            subject: self.subject,
            instructions: self.instructions,
            content: self.content,
            created_at: Utc::now(),
        }
    }
}
