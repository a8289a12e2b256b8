//! Live fact extraction
//!
//! Runs beside the provider chain on every turn and never fails: a remote
//! extraction backend is tried first, the regex heuristic answers otherwise.

use std::sync::Arc;
use std::time::Duration;

use triage_core::{render_transcript, FactRecord};
use triage_llm::{strip_code_fences, LlmBackend, LlmError, PromptBuilder};
use triage_text_processing::HeuristicExtractor;

use crate::completion::decode_object;
use crate::dialogue::DialogueSnapshot;
use crate::policy::expand_contextual_answers;

/// Per-turn partial fact extractor
pub struct LiveExtractor {
    backend: Option<Arc<dyn LlmBackend>>,
    window_lines: usize,
    timeout: Duration,
    heuristic: HeuristicExtractor,
}

impl LiveExtractor {
    pub fn new(backend: Option<Arc<dyn LlmBackend>>, window_lines: usize, timeout: Duration) -> Self {
        Self {
            backend,
            window_lines: window_lines.max(1),
            timeout,
            heuristic: HeuristicExtractor::new(),
        }
    }

    /// Heuristic-only extractor
    pub fn heuristic_only() -> Self {
        Self::new(None, 12, Duration::from_secs(10))
    }

    /// Partial facts for the snapshot. Does not touch the session.
    pub async fn extract_partial(&self, snapshot: &DialogueSnapshot) -> FactRecord {
        if snapshot.user_turn_count() == 0 {
            return FactRecord::default();
        }

        if let Some(backend) = &self.backend {
            match self.extract_remote(backend.as_ref(), snapshot).await {
                Ok(facts) if !facts.is_empty() => return facts,
                Ok(_) => tracing::debug!(
                    session_id = %snapshot.session_id,
                    "Remote extraction returned no facts, using heuristic"
                ),
                Err(e) => tracing::warn!(
                    session_id = %snapshot.session_id,
                    provider = %backend.provider_name(),
                    error = %e,
                    "Remote extraction failed, using heuristic"
                ),
            }
        }

        self.heuristic
            .extract(&expand_contextual_answers(&snapshot.turns))
    }

    async fn extract_remote(
        &self,
        backend: &dyn LlmBackend,
        snapshot: &DialogueSnapshot,
    ) -> Result<FactRecord, LlmError> {
        let window = self.window(snapshot);
        let messages = PromptBuilder::extraction(&window);
        let result = tokio::time::timeout(self.timeout, backend.generate(&messages))
            .await
            .map_err(|_| LlmError::Timeout)??;

        let value = decode_object(strip_code_fences(&result.text))
            .map_err(|f| LlmError::InvalidResponse(f.to_string()))?;
        Ok(FactRecord::from_json_value(&value))
    }

    /// Last `window_lines` transcript lines
    fn window(&self, snapshot: &DialogueSnapshot) -> String {
        let transcript = render_transcript(&snapshot.turns);
        let lines: Vec<&str> = transcript.lines().collect();
        let start = lines.len().saturating_sub(self.window_lines);
        lines[start..].join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use triage_core::Turn;
    use triage_llm::{FinishReason, GenerationResult, Message};

    struct CannedBackend {
        reply: Result<&'static str, ()>,
        seen: Mutex<Option<String>>,
    }

    #[async_trait]
    impl LlmBackend for CannedBackend {
        async fn generate(&self, messages: &[Message]) -> Result<GenerationResult, LlmError> {
            *self.seen.lock() = messages.last().map(|m| m.content.clone());
            match self.reply {
                Ok(text) => Ok(GenerationResult {
                    text: text.to_string(),
                    tokens: 10,
                    total_time_ms: 1,
                    finish_reason: FinishReason::Stop,
                }),
                Err(()) => Err(LlmError::Network("unreachable".to_string())),
            }
        }

        fn provider_name(&self) -> &str {
            "canned"
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    fn snapshot(turns: Vec<Turn>) -> DialogueSnapshot {
        DialogueSnapshot {
            session_id: "s1".to_string(),
            turns,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_remote_facts_used() {
        let backend = Arc::new(CannedBackend {
            reply: Ok("```json\n{\"is_breathing\": \"no\", \"age\": 70}\n```"),
            seen: Mutex::new(None),
        });
        let extractor = LiveExtractor::new(Some(backend), 12, Duration::from_secs(1));
        let facts = extractor
            .extract_partial(&snapshot(vec![Turn::user("my grandfather collapsed")]))
            .await;
        assert_eq!(facts.is_breathing, Some(false));
        assert_eq!(facts.age, Some(70));
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back_to_heuristic() {
        let backend = Arc::new(CannedBackend {
            reply: Err(()),
            seen: Mutex::new(None),
        });
        let extractor = LiveExtractor::new(Some(backend), 12, Duration::from_secs(1));
        let facts = extractor
            .extract_partial(&snapshot(vec![
                Turn::assistant("Is the person breathing?"),
                Turn::user("no"),
            ]))
            .await;
        assert_eq!(facts.is_breathing, Some(false));
    }

    #[tokio::test]
    async fn test_malformed_remote_json_falls_back() {
        let backend = Arc::new(CannedBackend {
            reply: Ok("I think he is fine"),
            seen: Mutex::new(None),
        });
        let extractor = LiveExtractor::new(Some(backend), 12, Duration::from_secs(1));
        let facts = extractor
            .extract_partial(&snapshot(vec![Turn::user("the patient is not conscious")]))
            .await;
        assert_eq!(facts.is_conscious, Some(false));
    }

    #[tokio::test]
    async fn test_window_keeps_last_lines() {
        let backend = Arc::new(CannedBackend {
            reply: Ok("{}"),
            seen: Mutex::new(None),
        });
        let extractor = LiveExtractor::new(Some(backend.clone()), 2, Duration::from_secs(1));
        extractor
            .extract_partial(&snapshot(vec![
                Turn::user("first message"),
                Turn::assistant("second"),
                Turn::user("third message"),
            ]))
            .await;
        let seen = backend.seen.lock().clone().unwrap();
        assert!(!seen.contains("first message"));
        assert!(seen.contains("AI: second"));
        assert!(seen.contains("Caller: third message"));
    }

    #[tokio::test]
    async fn test_nothing_said_is_empty() {
        let extractor = LiveExtractor::heuristic_only();
        assert!(extractor.extract_partial(&snapshot(vec![])).await.is_empty());
    }
}
