//! BoxResponseGenerator -- object-safe dynamic dispatch wrapper for
//! ResponseGenerator.
//!
//! 1. `ResponseGeneratorDyn` is object-safe with boxed futures
//! 2. Blanket-impl `ResponseGeneratorDyn` for all `T: ResponseGenerator`
//! 3. `BoxResponseGenerator` wraps `Box<dyn ResponseGeneratorDyn>` and
//!    delegates

use std::future::Future;
use std::pin::Pin;

use aula_types::chat::ContextEntry;
use aula_types::llm::LlmError;

use super::generator::ResponseGenerator;

/// Object-safe version of [`ResponseGenerator`] with boxed futures.
pub trait ResponseGeneratorDyn: Send + Sync {
    fn name(&self) -> &str;

    fn generate_boxed<'a>(
        &'a self,
        context: &'a [ContextEntry],
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

impl<T: ResponseGenerator> ResponseGeneratorDyn for T {
    fn name(&self) -> &str {
        ResponseGenerator::name(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        context: &'a [ContextEntry],
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(context))
    }
}

/// Type-erased generator chosen at startup from configuration.
///
/// `ResponseGenerator` uses RPITIT and cannot be a trait object directly,
/// so this wrapper delegates to `ResponseGeneratorDyn`. It implements
/// `ResponseGenerator` itself and can be handed to `ChatService`.
pub struct BoxResponseGenerator {
    inner: Box<dyn ResponseGeneratorDyn + Send + Sync>,
}

impl BoxResponseGenerator {
    pub fn new<T: ResponseGenerator + 'static>(generator: T) -> Self {
        Self {
            inner: Box::new(generator),
        }
    }

    /// Name of the wrapped generator.
    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

impl ResponseGenerator for BoxResponseGenerator {
    fn name(&self) -> &str {
        BoxResponseGenerator::name(self)
    }

    async fn generate(&self, context: &[ContextEntry]) -> Result<String, LlmError> {
        self.inner.generate_boxed(context).await
    }
}
