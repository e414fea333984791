//! Durable store traits.
//!
//! The conversation cache treats the store as an opaque, key-addressed
//! asynchronous service. Implementations live in aula-infra
//! (e.g., `SqliteChatRepository`). Uses native async fn in traits
//! (RPITIT, Rust 2024 edition).

use aula_types::chat::ChatTurn;
use aula_types::error::RepositoryError;
use aula_types::topic::Topic;
use aula_types::user::UserProfile;

/// Persistence of chat turns.
pub trait ChatRepository: Send + Sync {
    /// Up to `limit` most recent turns for a (user, topic) pair,
    /// returned oldest first.
    fn read_recent_turns(
        &self,
        user_id: &str,
        topic: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    /// Persist one turn and record activity for its user.
    fn write_turn(
        &self,
        turn: &ChatTurn,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Most recent turns across topics, optionally for one user, oldest first.
    fn list_turns(
        &self,
        user_id: Option<&str>,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send;

    /// Count all stored turns.
    fn count_turns(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Delete every stored turn and user record.
    fn clear_all(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}

/// Registry of topics and their instructional prompts.
pub trait TopicRepository: Send + Sync {
    /// The prompt for `topic`, or an empty string if it is not registered.
    fn read_topic_prompt(
        &self,
        topic: &str,
    ) -> impl std::future::Future<Output = Result<String, RepositoryError>> + Send;

    /// Register a topic. Fails with `Conflict` if the name is taken.
    fn create_topic(
        &self,
        topic: &Topic,
    ) -> impl std::future::Future<Output = Result<Topic, RepositoryError>> + Send;

    fn get_topic(
        &self,
        name: &str,
    ) -> impl std::future::Future<Output = Result<Option<Topic>, RepositoryError>> + Send;

    /// All topics, ordered by name.
    fn list_topics(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Topic>, RepositoryError>> + Send;

    fn count_topics(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}

/// User registration and profile lookup.
pub trait UserRepository: Send + Sync {
    /// Register a user, returning the existing profile if already known.
    fn register_user(
        &self,
        user_id: &str,
        classroom: Option<&str>,
    ) -> impl std::future::Future<Output = Result<UserProfile, RepositoryError>> + Send;

    fn get_user(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<UserProfile>, RepositoryError>> + Send;

    fn count_users(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
