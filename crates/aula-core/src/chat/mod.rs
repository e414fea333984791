//! Conversation memory and the chat request flow.
//!
//! - [`conversation`]: one (user, topic) sliding message window with a
//!   memoized context view.
//! - [`manager`]: the bounded directory of live conversations in front of
//!   the durable store.
//! - [`repository`]: durable store traits implemented by `aula-infra`.
//! - [`service`]: the end-to-end message flow used by the API and CLI.
//! - [`sweeper`]: background expiry of idle conversations.

pub mod conversation;
pub mod manager;
pub mod repository;
pub mod service;
pub mod sweeper;

#[cfg(test)]
pub(crate) mod testing;
