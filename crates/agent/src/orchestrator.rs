//! Provider chain orchestrator
//!
//! Remote providers are tried once each, in order. The first usable reply
//! wins; the local policy answers when every remote failed or none is
//! configured. A turn therefore always produces a reply.

use std::sync::Arc;
use std::time::Instant;

use triage_llm::prompt::WRAP_UP_INSTRUCTION;
use triage_llm::LlmError;

use crate::completion::{Completion, CompletionParser};
use crate::dialogue::DialogueSnapshot;
use crate::policy::{LocalCompletion, LocalDialoguePolicy, PolicyDecision};
use crate::provider::DialogueProvider;

/// Provider name used for locally produced turns
pub const LOCAL_PROVIDER: &str = "local";

/// Opening line of every dialogue
pub const GREETING: &str = "Hello, this is the emergency triage line. I'm here to help you report an emergency. Can you tell me what's happening?";

/// Reply for one dialogue turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    /// Full assistant text, payload included when complete
    pub text: String,
    pub provider: String,
    /// Set when the reply carried the completion marker
    pub completion: Option<Completion>,
}

impl TurnReply {
    pub fn is_complete(&self) -> bool {
        self.completion.is_some()
    }

    /// Split off a completed reply; an ongoing one comes back unchanged
    pub fn into_final(self) -> Result<FinalReply, TurnReply> {
        match self {
            TurnReply {
                text,
                provider,
                completion: Some(completion),
            } => Ok(FinalReply {
                text,
                provider,
                completion,
            }),
            ongoing => Err(ongoing),
        }
    }

    fn local(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            provider: LOCAL_PROVIDER.to_string(),
            completion: None,
        }
    }

    fn remote(text: String, provider: &str) -> Self {
        let completion = CompletionParser::parse(&text);
        Self {
            text,
            provider: provider.to_string(),
            completion,
        }
    }
}

/// Reply that ends a dialogue
#[derive(Debug, Clone)]
pub struct FinalReply {
    pub text: String,
    pub provider: String,
    pub completion: Completion,
}

impl FinalReply {
    fn local(local: LocalCompletion) -> Self {
        let display_text = local
            .reply
            .split(triage_core::COMPLETION_MARKER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        Self {
            text: local.reply,
            provider: LOCAL_PROVIDER.to_string(),
            completion: Completion {
                display_text,
                facts: local.facts,
                classification: Some(local.classification),
                failure: None,
            },
        }
    }
}

impl From<FinalReply> for TurnReply {
    fn from(reply: FinalReply) -> Self {
        Self {
            text: reply.text,
            provider: reply.provider,
            completion: Some(reply.completion),
        }
    }
}

/// Ordered remote providers with the local policy last
pub struct ProviderChain {
    remotes: Vec<Arc<dyn DialogueProvider>>,
    local: LocalDialoguePolicy,
}

impl ProviderChain {
    pub fn new(remotes: Vec<Arc<dyn DialogueProvider>>, local: LocalDialoguePolicy) -> Self {
        Self { remotes, local }
    }

    /// Chain with no remote providers
    pub fn local_only(local: LocalDialoguePolicy) -> Self {
        Self::new(Vec::new(), local)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.remotes
            .iter()
            .map(|p| p.name())
            .chain(std::iter::once(LOCAL_PROVIDER))
            .collect()
    }

    /// Next assistant reply for the snapshot
    pub async fn next_turn(&self, snapshot: &DialogueSnapshot) -> TurnReply {
        if snapshot.user_turn_count() == 0 {
            return TurnReply::local(GREETING);
        }

        for provider in &self.remotes {
            if let Some(text) = self.attempt(provider.as_ref(), snapshot).await {
                return TurnReply::remote(text, provider.name());
            }
        }

        match self.local.decide(snapshot) {
            PolicyDecision::Reply(text) => TurnReply::local(text),
            PolicyDecision::Complete(local) => FinalReply::local(local).into(),
        }
    }

    /// Completed reply, asking remotes to wrap up first.
    ///
    /// A remote reply without the marker is discarded and the local policy
    /// completes from what is known.
    pub async fn wrap_up(&self, snapshot: &DialogueSnapshot) -> FinalReply {
        let instructed = snapshot.with_instruction(WRAP_UP_INSTRUCTION);

        for provider in &self.remotes {
            let Some(text) = self.attempt(provider.as_ref(), &instructed).await else {
                continue;
            };
            if let Ok(reply) = TurnReply::remote(text, provider.name()).into_final() {
                return reply;
            }
            tracing::warn!(
                session_id = %snapshot.session_id,
                provider = %provider.name(),
                "Provider ignored wrap-up instruction"
            );
        }

        self.force_local(snapshot)
    }

    /// Local completion, no remote calls
    pub fn force_local(&self, snapshot: &DialogueSnapshot) -> FinalReply {
        FinalReply::local(self.local.complete(snapshot))
    }

    async fn attempt(
        &self,
        provider: &dyn DialogueProvider,
        snapshot: &DialogueSnapshot,
    ) -> Option<String> {
        let name = provider.name().to_string();
        let start = Instant::now();
        let result = provider.next_turn(snapshot).await;
        let elapsed = start.elapsed();

        metrics::histogram!("triage_provider_latency_seconds", "provider" => name.clone())
            .record(elapsed.as_secs_f64());

        match result {
            Ok(text) => {
                metrics::counter!(
                    "triage_provider_requests_total",
                    "provider" => name.clone(),
                    "outcome" => "ok"
                )
                .increment(1);
                tracing::debug!(
                    session_id = %snapshot.session_id,
                    provider = %name,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Provider replied"
                );
                Some(text)
            }
            Err(e) => {
                record_failure(&name, &e);
                tracing::warn!(
                    session_id = %snapshot.session_id,
                    provider = %name,
                    kind = e.kind(),
                    error = %e,
                    "Provider failed, trying next"
                );
                None
            }
        }
    }
}

fn record_failure(provider: &str, error: &LlmError) {
    metrics::counter!(
        "triage_provider_requests_total",
        "provider" => provider.to_string(),
        "outcome" => error.kind()
    )
    .increment(1);
}
