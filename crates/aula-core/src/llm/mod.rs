//! Response generation abstractions.
//!
//! - `ResponseGenerator`: RPITIT trait implemented by inference backends
//! - `BoxResponseGenerator`: object-safe wrapper for runtime selection
//! - `KeywordResponder` / `WithFallback`: canned replies when the model is
//!   unavailable
//! - `EchoGenerator`: model-free generator for wiring and tests

pub mod box_generator;
pub mod echo;
pub mod fallback;
pub mod generator;
