//! Infrastructure layer for Aula.
//!
//! Contains implementations of the traits defined in `aula-core`: SQLite
//! storage for turns, topics and users, the HuggingFace inference client,
//! plus the config loader and data directory resolution.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
