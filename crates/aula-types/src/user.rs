//! User profile types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user known to the durable store.
///
/// Profiles are created on registration or on the user's first stored turn;
/// `message_count` counts persisted turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub classroom: Option<String>,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub message_count: u64,
}
