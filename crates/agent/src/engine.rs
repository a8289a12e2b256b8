//! Triage engine
//!
//! The only entry point channel adapters use. Callers hold session ids; the
//! sessions themselves stay inside the registry.
//!
//! A dialogue turn runs as:
//!
//! ```text
//! add_user_message ──► keyword detector ──► CriticalAlert (immediately)
//!        │
//! next_turn ──► snapshot ──┬─► provider chain ──┐
//!                          └─► live extractor ──┴─► join ──► merge facts
//!                                                      │
//!                                   reply appended, or report finalized
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch};

use triage_config::{
    ClassificationConfig, DialogueConfig, ExtractionConfig, RegistryConfig, Settings,
};
use triage_core::{
    Classification, FactRecord, InputSource, Question, ReportStore, SpeechTranscoder,
    TriageReport,
};
use triage_llm::{strip_code_fences, LlmBackend, LlmError, LlmFactory, PromptBuilder};
use triage_text_processing::{
    CriticalKeywordDetector, EscalationSignal, HeuristicExtractor, SeverityClassifier,
};

use crate::completion::{classification_from_value, decode_object};
use crate::dialogue::DialogueSession;
use crate::events::{EngineEvent, EventBus, SessionKind};
use crate::extractor::LiveExtractor;
use crate::interview::{InterviewStep, NO_DESCRIPTION};
use crate::orchestrator::{FinalReply, ProviderChain};
use crate::policy::{LocalDialoguePolicy, LOCAL_CLOSING};
use crate::provider::{DialogueProvider, RemoteDialogueProvider};
use crate::registry::SessionRegistry;
use crate::store::InMemoryReportStore;
use crate::AgentError;

/// Model name recorded when the keyword classifier decided
pub const KEYWORD_CLASSIFIER: &str = "keyword_classifier";

/// Result of one dialogue turn
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub session_id: String,
    /// Caller-facing text, payload removed
    pub display_text: String,
    pub is_complete: bool,
    pub provider: String,
    pub classification: Option<Classification>,
    pub report: Option<TriageReport>,
    /// Set when the store accepted the report
    pub report_id: Option<String>,
    /// Live facts after this turn's merge
    pub partial_facts: FactRecord,
    /// Escalation raised by the utterance, for `handle_utterance`
    pub escalation: Option<EscalationSignal>,
}

/// Result of one interview answer
#[derive(Debug, Clone)]
pub struct InterviewOutcome {
    pub session_id: String,
    pub next_question: Option<&'static Question>,
    pub is_complete: bool,
    pub classification: Option<Classification>,
    pub report: Option<TriageReport>,
    pub report_id: Option<String>,
    pub escalation: Option<EscalationSignal>,
}

/// Form-style intake: free text plus whatever the form already knows
#[derive(Debug, Clone, Default)]
pub struct TextTriageRequest {
    pub text: String,
    pub facts: FactRecord,
    pub caller_phone: Option<String>,
}

/// A finalized report and the id the store gave it
#[derive(Debug, Clone)]
pub struct FiledReport {
    pub report_id: Option<String>,
    pub report: TriageReport,
}

/// Builder for [`TriageEngine`]
pub struct EngineBuilder {
    dialogue_providers: Vec<Arc<dyn DialogueProvider>>,
    extraction_backend: Option<Arc<dyn LlmBackend>>,
    extraction: ExtractionConfig,
    classification_backends: Vec<Arc<dyn LlmBackend>>,
    classification: ClassificationConfig,
    store: Option<Arc<dyn ReportStore>>,
    transcoder: Option<Arc<dyn SpeechTranscoder>>,
    dialogue: DialogueConfig,
    registry: RegistryConfig,
    event_capacity: usize,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            dialogue_providers: Vec::new(),
            extraction_backend: None,
            extraction: ExtractionConfig::default(),
            classification_backends: Vec::new(),
            classification: ClassificationConfig::default(),
            store: None,
            transcoder: None,
            dialogue: DialogueConfig::default(),
            registry: RegistryConfig::default(),
            event_capacity: 256,
        }
    }
}

impl EngineBuilder {
    /// Append a remote dialogue provider; order of calls is chain order
    pub fn with_dialogue_provider(mut self, provider: Arc<dyn DialogueProvider>) -> Self {
        self.dialogue_providers.push(provider);
        self
    }

    pub fn with_extraction_backend(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.extraction_backend = Some(backend);
        self
    }

    pub fn with_extraction_config(mut self, config: ExtractionConfig) -> Self {
        self.extraction = config;
        self
    }

    /// Append a classification backend for `triage_text`
    pub fn with_classification_backend(mut self, backend: Arc<dyn LlmBackend>) -> Self {
        self.classification_backends.push(backend);
        self
    }

    pub fn with_classification_config(mut self, config: ClassificationConfig) -> Self {
        self.classification = config;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn ReportStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_transcoder(mut self, transcoder: Arc<dyn SpeechTranscoder>) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    pub fn with_dialogue_config(mut self, config: DialogueConfig) -> Self {
        self.dialogue = config;
        self
    }

    pub fn with_registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry = config;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn build(self) -> TriageEngine {
        let chain = ProviderChain::new(
            self.dialogue_providers,
            LocalDialoguePolicy::new(self.dialogue),
        );
        let extractor = LiveExtractor::new(
            self.extraction_backend,
            self.extraction.window_lines,
            self.extraction.timeout(),
        );

        tracing::info!(
            providers = ?chain.provider_names(),
            classification_backends = self.classification_backends.len(),
            "Triage engine ready"
        );

        TriageEngine {
            registry: SessionRegistry::new(&self.registry),
            chain,
            extractor,
            classifier: SeverityClassifier::new(),
            heuristic: HeuristicExtractor::new(),
            detector: CriticalKeywordDetector::new(),
            classification_backends: self.classification_backends,
            classification_timeout: self.classification.timeout(),
            store: self
                .store
                .unwrap_or_else(|| Arc::new(InMemoryReportStore::new()) as Arc<dyn ReportStore>),
            transcoder: self.transcoder,
            events: EventBus::new(self.event_capacity),
        }
    }
}

/// Conversational triage engine
pub struct TriageEngine {
    registry: SessionRegistry,
    chain: ProviderChain,
    extractor: LiveExtractor,
    classifier: SeverityClassifier,
    heuristic: HeuristicExtractor,
    detector: CriticalKeywordDetector,
    classification_backends: Vec<Arc<dyn LlmBackend>>,
    classification_timeout: Duration,
    store: Arc<dyn ReportStore>,
    transcoder: Option<Arc<dyn SpeechTranscoder>>,
    events: EventBus,
}

impl TriageEngine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Builder wired from settings: remote providers with usable keys, the
    /// local policy last. Add a store or transcoder before `build()`.
    pub fn from_settings(settings: &Settings) -> EngineBuilder {
        let mut builder = Self::builder()
            .with_dialogue_config(settings.dialogue)
            .with_registry_config(settings.registry.clone())
            .with_extraction_config(settings.extraction.clone())
            .with_classification_config(settings.classification.clone());

        for backend in LlmFactory::dialogue_backends(&settings.providers) {
            let timeout = match backend.provider_name() {
                "minimax" => settings.providers.minimax.timeout(),
                _ => settings.providers.groq.timeout(),
            };
            builder = builder
                .with_dialogue_provider(Arc::new(RemoteDialogueProvider::new(backend, timeout)));
        }
        if let Some(backend) = LlmFactory::extraction_backend(settings) {
            builder = builder.with_extraction_backend(backend);
        }
        for backend in LlmFactory::classification_backends(settings) {
            builder = builder.with_classification_backend(backend);
        }
        builder
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn session_count(&self) -> usize {
        self.registry.count()
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.chain.provider_names()
    }

    // ---- Dialogue ----

    pub fn create_dialogue(&self) -> Result<String, AgentError> {
        let (id, _) = self.registry.create_dialogue()?;
        self.events.publish(EngineEvent::SessionCreated {
            session_id: id.clone(),
            kind: SessionKind::Dialogue,
        });
        Ok(id)
    }

    /// Append a caller message and scan it for life-threatening phrases.
    ///
    /// The alert is published before any remote call is made.
    pub async fn add_user_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<Option<EscalationSignal>, AgentError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::InvalidInput("empty message".to_string()));
        }

        let session = self.registry.dialogue(session_id)?;
        session.lock().await.push_user(text);

        Ok(self.scan(session_id, text))
    }

    /// Produce the next assistant turn, finalizing when the reply completes
    pub async fn next_turn(&self, session_id: &str) -> Result<TurnOutcome, AgentError> {
        let session = self.registry.dialogue(session_id)?;
        let mut session = session.lock().await;
        let snapshot = session.snapshot();

        let (reply, partial) = tokio::join!(
            self.chain.next_turn(&snapshot),
            self.extractor.extract_partial(&snapshot)
        );

        // Removed while the calls were in flight
        if !self.registry.contains(session_id) {
            return Err(AgentError::SessionNotFound(session_id.to_string()));
        }

        if !partial.is_empty() {
            session.live_facts.merge(&partial);
            self.events.publish(EngineEvent::PartialFacts {
                session_id: session_id.to_string(),
                facts: session.live_facts.clone(),
            });
        }

        match reply.into_final() {
            Ok(done) => Ok(self.finalize_dialogue(&mut session, done).await),
            Err(reply) => {
                session.push_assistant(reply.text.clone(), reply.provider.clone());
                Ok(TurnOutcome {
                    session_id: session_id.to_string(),
                    display_text: reply.text,
                    is_complete: false,
                    provider: reply.provider,
                    classification: None,
                    report: None,
                    report_id: None,
                    partial_facts: session.live_facts.clone(),
                    escalation: None,
                })
            }
        }
    }

    /// `add_user_message` followed by `next_turn`
    pub async fn handle_utterance(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let escalation = self.add_user_message(session_id, text).await?;
        let mut outcome = self.next_turn(session_id).await?;
        outcome.escalation = escalation;
        Ok(outcome)
    }

    /// Transcribe a spoken turn and handle it as an utterance
    pub async fn handle_audio(
        &self,
        session_id: &str,
        audio: &[u8],
        filename_hint: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let transcoder = self
            .transcoder
            .as_ref()
            .ok_or_else(|| AgentError::Speech("no speech transcoder configured".to_string()))?;

        let text = transcoder
            .transcribe(audio, filename_hint)
            .await
            .map_err(|e| AgentError::Speech(e.to_string()))?;
        if text.trim().is_empty() {
            return Err(AgentError::Speech("transcription was empty".to_string()));
        }

        tracing::debug!(
            session_id = %session_id,
            transcoder = %transcoder.name(),
            chars = text.len(),
            "Audio transcribed"
        );

        let session = self.registry.dialogue(session_id)?;
        session.lock().await.source = InputSource::VoiceCall;

        self.handle_utterance(session_id, &text).await
    }

    /// Synthesize a reply for voice channels
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, AgentError> {
        let transcoder = self
            .transcoder
            .as_ref()
            .ok_or_else(|| AgentError::Speech("no speech transcoder configured".to_string()))?;
        transcoder
            .synthesize(text)
            .await
            .map_err(|e| AgentError::Speech(e.to_string()))
    }

    /// Finish a dialogue now and return its report
    pub async fn end_now(&self, session_id: &str) -> Result<TriageReport, AgentError> {
        let session = self.registry.dialogue(session_id)?;
        let mut session = session.lock().await;
        let snapshot = session.snapshot();

        let done = self.chain.wrap_up(&snapshot).await;

        if !self.registry.contains(session_id) {
            return Err(AgentError::SessionNotFound(session_id.to_string()));
        }

        let outcome = self.finalize_dialogue(&mut session, done).await;
        outcome
            .report
            .ok_or_else(|| AgentError::SessionNotFound(session_id.to_string()))
    }

    async fn finalize_dialogue(&self, session: &mut DialogueSession, done: FinalReply) -> TurnOutcome {
        let FinalReply {
            text,
            provider,
            completion,
        } = done;

        if let Some(failure) = &completion.failure {
            tracing::warn!(
                session_id = %session.id,
                provider = %provider,
                reason = %failure,
                "Completion payload unreadable, using conservative classification"
            );
        }

        session.push_assistant(text, provider.clone());

        let mut facts = completion.facts;
        facts.fill_gaps(&session.live_facts);
        if !facts.has_situation() {
            let joined = session.user_texts().join(" | ");
            facts.situation_description = Some(if joined.trim().is_empty() {
                NO_DESCRIPTION.to_string()
            } else {
                joined
            });
        }

        let classification = completion
            .classification
            .unwrap_or_else(|| self.classifier.classify_case(&facts));

        session.is_complete = true;
        session.facts = Some(facts.clone());
        session.classification = Some(classification.clone());

        let report = TriageReport::new(
            session.source,
            facts,
            classification.clone(),
            session.transcript(),
            provider.clone(),
        );
        let report_id = self.file_report(&session.id, &report).await;
        self.retire(&session.id);

        let display_text = if completion.display_text.is_empty() {
            LOCAL_CLOSING.to_string()
        } else {
            completion.display_text
        };

        TurnOutcome {
            session_id: session.id.clone(),
            display_text,
            is_complete: true,
            provider,
            classification: Some(classification),
            report: Some(report),
            report_id,
            partial_facts: session.live_facts.clone(),
            escalation: None,
        }
    }

    // ---- Structured interview ----

    pub fn create_interview(&self, caller: Option<String>) -> Result<String, AgentError> {
        let (id, _) = self.registry.create_interview(caller)?;
        self.events.publish(EngineEvent::SessionCreated {
            session_id: id.clone(),
            kind: SessionKind::Interview,
        });
        Ok(id)
    }

    pub async fn current_question(
        &self,
        session_id: &str,
    ) -> Result<Option<&'static Question>, AgentError> {
        let session = self.registry.interview(session_id)?;
        let interview = session.lock().await;
        Ok(interview.current_question())
    }

    /// Record an answer; the eleventh one files the report
    pub async fn answer_interview(
        &self,
        session_id: &str,
        raw: &str,
    ) -> Result<InterviewOutcome, AgentError> {
        let session = self.registry.interview(session_id)?;
        let mut interview = session.lock().await;

        // A racing caller may have filed the report while we waited
        if interview.is_complete() || !self.registry.contains(session_id) {
            return Err(AgentError::SessionNotFound(session_id.to_string()));
        }

        let escalation = self.scan(session_id, raw);

        let next_question = match interview.answer(raw) {
            InterviewStep::Next(question) => question,
            InterviewStep::Complete => {
                let facts = interview.to_fact_record();
                let classification = self.classifier.classify_case(&facts);
                let report = TriageReport::new(
                    InputSource::PhoneCall,
                    facts,
                    classification.clone(),
                    interview.transcript(),
                    KEYWORD_CLASSIFIER,
                )
                .with_caller_phone(interview.caller.clone());

                let report_id = self.file_report(session_id, &report).await;
                self.retire(session_id);

                return Ok(InterviewOutcome {
                    session_id: session_id.to_string(),
                    next_question: None,
                    is_complete: true,
                    classification: Some(classification),
                    report: Some(report),
                    report_id,
                    escalation,
                });
            }
        };

        Ok(InterviewOutcome {
            session_id: session_id.to_string(),
            next_question: Some(next_question),
            is_complete: false,
            classification: None,
            report: None,
            report_id: None,
            escalation,
        })
    }

    // ---- Single-shot text ----

    /// Classify a form-style report in one go.
    ///
    /// Facts the form left blank are filled from the text. Remote classifiers are tried in order; the keyword classifier decides
    /// when none is configured or all of them fail.
    pub async fn triage_text(&self, request: TextTriageRequest) -> Result<FiledReport, AgentError> {
        let text = request.text.trim();
        let mut facts = request.facts;
        if !facts.has_situation() {
            if text.is_empty() {
                return Err(AgentError::InvalidInput(
                    "a description of the emergency is required".to_string(),
                ));
            }
            facts.situation_description = Some(text.to_string());
        }
        if !text.is_empty() {
            facts.fill_gaps(&self.heuristic.extract(&[text]));
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        self.events.publish(EngineEvent::SessionCreated {
            session_id: session_id.clone(),
            kind: SessionKind::Text,
        });
        if !text.is_empty() {
            self.scan(&session_id, text);
        }

        let report_text = describe_case(&facts);
        let (classification, ai_model) = match self.classify_remote(&report_text).await {
            Some(found) => found,
            None => (
                self.classifier.classify_case(&facts),
                KEYWORD_CLASSIFIER.to_string(),
            ),
        };

        let transcript = if text.is_empty() {
            String::new()
        } else {
            format!("Caller: {}", text)
        };
        let report = TriageReport::new(InputSource::Text, facts, classification, transcript, ai_model)
            .with_caller_phone(request.caller_phone);

        let report_id = self.file_report(&session_id, &report).await;
        Ok(FiledReport { report_id, report })
    }

    async fn classify_remote(&self, report_text: &str) -> Option<(Classification, String)> {
        let messages = PromptBuilder::classification(report_text);

        for backend in &self.classification_backends {
            let result = tokio::time::timeout(self.classification_timeout, backend.generate(&messages))
                .await
                .map_err(|_| LlmError::Timeout)
                .and_then(|r| r)
                .and_then(|r| {
                    decode_object(strip_code_fences(&r.text))
                        .map_err(|f| LlmError::InvalidResponse(f.to_string()))
                });

            match result {
                Ok(value) => match classification_from_value(&value) {
                    Some(classification) => {
                        return Some((classification, backend.provider_name().to_string()))
                    }
                    None => tracing::warn!(
                        provider = %backend.provider_name(),
                        "Classification reply had no usable severity"
                    ),
                },
                Err(e) => tracing::warn!(
                    provider = %backend.provider_name(),
                    kind = e.kind(),
                    error = %e,
                    "Remote classification failed, trying next"
                ),
            }
        }
        None
    }

    // ---- Lifecycle ----

    /// Drop a session of either kind. In-flight calls on it return
    /// `SessionNotFound` and their results are discarded.
    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.registry.remove(session_id);
        if removed {
            self.events.publish(EngineEvent::SessionRemoved {
                session_id: session_id.to_string(),
            });
        }
        removed
    }

    /// Periodically evict idle sessions.
    ///
    /// Returns a shutdown sender; send `true` to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let engine = Arc::clone(self);
        let period = engine.registry.cleanup_interval();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let expired = engine.registry.cleanup_expired();
                        if !expired.is_empty() {
                            tracing::info!(
                                removed = expired.len(),
                                remaining = engine.registry.count(),
                                "Idle session cleanup"
                            );
                        }
                        for session_id in expired {
                            engine.events.publish(EngineEvent::SessionRemoved { session_id });
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }

    fn scan(&self, session_id: &str, text: &str) -> Option<EscalationSignal> {
        let signal = self.detector.detect(text)?;

        metrics::counter!(
            "triage_critical_alerts_total",
            "severity" => signal.severity.as_str()
        )
        .increment(1);
        tracing::warn!(
            session_id = %session_id,
            severity = %signal.severity,
            risk_factors = ?signal.risk_factors,
            "Escalation signal detected"
        );

        self.events.publish(EngineEvent::CriticalAlert {
            session_id: session_id.to_string(),
            signal: signal.clone(),
        });
        Some(signal)
    }

    async fn file_report(&self, session_id: &str, report: &TriageReport) -> Option<String> {
        metrics::counter!(
            "triage_reports_finalized_total",
            "severity" => report.classification.severity().as_str(),
            "source" => report.input_source.as_str()
        )
        .increment(1);

        match self.store.store(report.clone()).await {
            Ok(report_id) => {
                tracing::info!(
                    session_id = %session_id,
                    report_id = %report_id,
                    severity = %report.classification.severity(),
                    priority = report.classification.priority(),
                    source = report.input_source.as_str(),
                    "Report finalized"
                );
                self.events.publish(EngineEvent::ReportFinalized {
                    session_id: session_id.to_string(),
                    report_id: report_id.clone(),
                    report: Box::new(report.clone()),
                });
                Some(report_id)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    error = %e,
                    "Failed to store report"
                );
                None
            }
        }
    }

    fn retire(&self, session_id: &str) {
        self.remove(session_id);
    }
}

/// Render known facts as a plain report for the classification prompt
fn describe_case(facts: &FactRecord) -> String {
    fn yes_no(value: Option<bool>) -> &'static str {
        match value {
            Some(true) => "yes",
            Some(false) => "no",
            None => "unknown",
        }
    }

    let mut lines = vec![format!(
        "Situation: {}",
        facts.situation_description.as_deref().unwrap_or(NO_DESCRIPTION)
    )];
    if let Some(disaster) = &facts.disaster_type {
        lines.push(format!("Disaster type: {}", disaster));
    }
    if let Some(age) = facts.age {
        lines.push(format!("Patient age: {}", age));
    }
    if let Some(location) = &facts.location {
        lines.push(format!("Location: {}", location));
    }
    lines.push(format!("Conscious: {}", yes_no(facts.is_conscious)));
    lines.push(format!("Breathing: {}", yes_no(facts.is_breathing)));
    lines.push(format!("Heavy bleeding: {}", yes_no(facts.has_heavy_bleeding)));
    lines.push(format!("Trapped: {}", yes_no(facts.is_trapped)));
    if let Some(victims) = facts.num_victims {
        lines.push(format!("Number of victims: {}", victims));
    }
    if let Some(dangers) = &facts.environmental_dangers {
        lines.push(format!("Environmental dangers: {}", dangers));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_case_lists_unknowns() {
        let facts = FactRecord {
            situation_description: Some("Wall collapsed".to_string()),
            is_trapped: Some(true),
            num_victims: Some(3),
            ..Default::default()
        };
        let text = describe_case(&facts);
        assert!(text.starts_with("Situation: Wall collapsed"));
        assert!(text.contains("Trapped: yes"));
        assert!(text.contains("Breathing: unknown"));
        assert!(text.contains("Number of victims: 3"));
        assert!(!text.contains("Location"));
    }

    #[tokio::test]
    async fn test_local_dialogue_opens_with_greeting() {
        let engine = TriageEngine::builder().build();
        let id = engine.create_dialogue().unwrap();
        let outcome = engine.next_turn(&id).await.unwrap();
        assert_eq!(outcome.display_text, crate::orchestrator::GREETING);
        assert!(!outcome.is_complete);
        assert_eq!(engine.session_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let engine = TriageEngine::builder().build();
        let id = engine.create_dialogue().unwrap();
        assert!(matches!(
            engine.add_user_message(&id, "   ").await,
            Err(AgentError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_audio_without_transcoder() {
        let engine = TriageEngine::builder().build();
        let id = engine.create_dialogue().unwrap();
        assert!(matches!(
            engine.handle_audio(&id, b"RIFF", "a.wav").await,
            Err(AgentError::Speech(_))
        ));
    }
}
