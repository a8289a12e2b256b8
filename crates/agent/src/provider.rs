//! Remote dialogue providers
//!
//! A provider turns a dialogue snapshot into the next assistant message.
//! Providers may fail; the orchestrator decides what happens next.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use triage_llm::{LlmBackend, LlmError, PromptBuilder};

use crate::dialogue::DialogueSnapshot;

/// One element of the provider chain
#[async_trait]
pub trait DialogueProvider: Send + Sync {
    /// Name recorded on turns and reports
    fn name(&self) -> &str;

    /// Next assistant message for the snapshot
    async fn next_turn(&self, snapshot: &DialogueSnapshot) -> Result<String, LlmError>;
}

/// Provider backed by a chat-completion backend
pub struct RemoteDialogueProvider {
    backend: Arc<dyn LlmBackend>,
    timeout: Duration,
}

impl RemoteDialogueProvider {
    pub fn new(backend: Arc<dyn LlmBackend>, timeout: Duration) -> Self {
        Self { backend, timeout }
    }
}

#[async_trait]
impl DialogueProvider for RemoteDialogueProvider {
    fn name(&self) -> &str {
        self.backend.provider_name()
    }

    async fn next_turn(&self, snapshot: &DialogueSnapshot) -> Result<String, LlmError> {
        let messages = PromptBuilder::conversation(&snapshot.turns);
        let result = tokio::time::timeout(self.timeout, self.backend.generate(&messages))
            .await
            .map_err(|_| LlmError::Timeout)??;

        let text = result.text.trim();
        if text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Turn;
    use triage_llm::{FinishReason, GenerationResult, Message, Role};

    struct SlowBackend {
        delay: Duration,
        reply: &'static str,
    }

    #[async_trait]
    impl LlmBackend for SlowBackend {
        async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
            assert_eq!(messages[0].role, Role::System);
            tokio::time::sleep(self.delay).await;
            Ok(GenerationResult {
                text: self.reply.to_string(),
                tokens: 3,
                total_time_ms: self.delay.as_millis() as u64,
                finish_reason: FinishReason::Stop,
            })
        }

        fn provider_name(&self) -> &str {
            "slow"
        }

        fn model_name(&self) -> &str {
            "test"
        }
    }

    fn snapshot() -> DialogueSnapshot {
        DialogueSnapshot {
            session_id: "s1".to_string(),
            turns: vec![Turn::user("my father collapsed")],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_reply_is_trimmed() {
        let provider = RemoteDialogueProvider::new(
            Arc::new(SlowBackend { delay: Duration::ZERO, reply: "  Is he breathing?\n" }),
            Duration::from_secs(1),
        );
        assert_eq!(provider.name(), "slow");
        assert_eq!(provider.next_turn(&snapshot()).await.unwrap(), "Is he breathing?");
    }

    #[tokio::test]
    async fn test_timeout_maps_to_timeout_error() {
        let provider = RemoteDialogueProvider::new(
            Arc::new(SlowBackend { delay: Duration::from_millis(200), reply: "late" }),
            Duration::from_millis(20),
        );
        let err = provider.next_turn(&snapshot()).await.unwrap_err();
        assert!(matches!(err, LlmError::Timeout));
    }

    #[tokio::test]
    async fn test_blank_reply_is_empty_error() {
        let provider = RemoteDialogueProvider::new(
            Arc::new(SlowBackend { delay: Duration::ZERO, reply: "   " }),
            Duration::from_secs(1),
        );
        let err = provider.next_turn(&snapshot()).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }
}
