//! Inference backends implementing `ResponseGenerator` from `aula-core`.

pub mod huggingface;
