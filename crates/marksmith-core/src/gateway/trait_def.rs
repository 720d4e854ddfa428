//! The `Generator` trait -- the adapter interface for text-generation
//! backends.
//!
//! Each provider (OpenAI-compatible, Anthropic, Gemini) implements this
//! trait. The trait is object-safe so the engine can hold an
//! `Arc<dyn Generator>` without knowing which wire format backs it.

use async_trait::async_trait;

use super::error::GatewayError;
use crate::prompt::PromptPair;

/// A single-shot text generation capability.
///
/// Batched requests are ordinary calls whose prompt asks for one output
/// line per item; the caller splits the reply with
/// [`crate::demux::demultiplex`].
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider identity used in logs and error messages (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one request and return the generated text.
    ///
    /// Implementations make exactly one attempt.
    async fn generate(&self, prompt: &PromptPair) -> Result<String, GatewayError>;
}

// Compile-time assertion: Generator must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};

#[cfg(test)]
mod tests {
    use super::*;

    /// Echoes the user prompt back, proving the trait works as `dyn`.
    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        fn name(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &PromptPair) -> Result<String, GatewayError> {
            Ok(prompt.user.clone())
        }
    }

    #[test]
    fn generator_is_object_safe() {
        let generator: Box<dyn Generator> = Box::new(EchoGenerator);
        assert_eq!(generator.name(), "echo");
    }

    #[tokio::test]
    async fn echo_generator_round_trip() {
        let generator: std::sync::Arc<dyn Generator> = std::sync::Arc::new(EchoGenerator);
        let prompt = PromptPair {
            system: "rules".into(),
            user: "x squared".into(),
        };
        assert_eq!(generator.generate(&prompt).await.unwrap(), "x squared");
    }
}
