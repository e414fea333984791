//! Model-free generator, selected with `inference.dummy = true`.

use aula_types::chat::ContextEntry;
use aula_types::llm::LlmError;

use super::generator::{ResponseGenerator, last_user_message};

/// Echoes the user's message and reports how much context it received.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoGenerator;

impl ResponseGenerator for EchoGenerator {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(&self, context: &[ContextEntry]) -> Result<String, LlmError> {
        let message = last_user_message(context).unwrap_or_default();
        Ok(format!(
            "You said: \"{message}\" ({} messages of context)",
            context.len()
        ))
    }
}
