//! HTTP/REST API layer for Aula.
//!
//! Axum-based REST API at `/api/v1/` with the envelope response format and
//! permissive CORS for the web frontend.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
