//! REST API endpoint handlers.

pub mod chat;
pub mod memory;
pub mod topic;
pub mod user;
