//! Conversation cache and chat flow for Aula.
//!
//! This crate owns the in-process conversation memory (`Conversation`,
//! `ChatMemoryManager`) and defines the "ports" (repository and generator
//! traits) that the infrastructure layer implements. It depends only on
//! `aula-types` -- never on `aula-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
