//! Shared domain types for Aula.
//!
//! This crate contains the types used across the Aula chat backend:
//! conversation messages, persisted turns, topics, users, configuration,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod topic;
pub mod user;
