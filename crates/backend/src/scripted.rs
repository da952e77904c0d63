//! Scripted backend — replays canned replies in order.
//!
//! Deterministic stand-in for tests: each `generate` call pops the next
//! queued reply. Running past the script returns `NotConfigured` so a test
//! that under-provisions replies fails loudly instead of hanging.

use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::sync::Mutex;
use valet_core::backend::TextBackend;
use valet_core::error::BackendError;

/// A backend that returns pre-scripted replies.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedBackend {
    /// Create a backend that replays the given replies in order.
    pub fn new(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of replies still queued.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }
}

#[async_trait]
impl TextBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, BackendError> {
        self.replies
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| BackendError::NotConfigured("script exhausted".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order() {
        let backend = ScriptedBackend::new(["first", "second"]);
        assert_eq!(backend.generate("ignored").await.unwrap(), "first");
        assert_eq!(backend.generate("ignored").await.unwrap(), "second");
        assert_eq!(backend.remaining().await, 0);
    }

    #[tokio::test]
    async fn exhausted_script_errors() {
        let backend = ScriptedBackend::new(Vec::<String>::new());
        let err = backend.generate("anything").await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }
}
