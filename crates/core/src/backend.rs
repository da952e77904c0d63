//! TextBackend trait — the abstraction over generation backends.
//!
//! This is the *only* interface the core requires of any LLM integration,
//! real or mocked: a prompt string in, a text completion out. The planner
//! calls `generate()` without knowing which backend is behind it — pure
//! polymorphism, selected at construction time.

use async_trait::async_trait;

use crate::error::BackendError;

/// A prompt-to-text generation capability.
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai", "scripted").
    fn name(&self) -> &str;

    /// Generate a text completion for the given prompt.
    async fn generate(&self, prompt: &str) -> std::result::Result<String, BackendError>;
}
