//! Engine events
//!
//! Published on a broadcast channel. Channel adapters and dashboards
//! subscribe; the engine never waits for them.

use serde::Serialize;
use tokio::sync::broadcast;

use triage_core::{FactRecord, TriageReport};
use triage_text_processing::EscalationSignal;

/// Kind of session an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Dialogue,
    Interview,
    /// Single-shot text intake, no registry entry
    Text,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    SessionCreated {
        session_id: String,
        kind: SessionKind,
    },
    /// Life-threatening phrase detected in an utterance
    CriticalAlert {
        session_id: String,
        signal: EscalationSignal,
    },
    PartialFacts {
        session_id: String,
        facts: FactRecord,
    },
    ReportFinalized {
        session_id: String,
        report_id: String,
        report: Box<TriageReport>,
    },
    SessionRemoved {
        session_id: String,
    },
}

impl EngineEvent {
    pub fn session_id(&self) -> &str {
        match self {
            EngineEvent::SessionCreated { session_id, .. }
            | EngineEvent::CriticalAlert { session_id, .. }
            | EngineEvent::PartialFacts { session_id, .. }
            | EngineEvent::ReportFinalized { session_id, .. }
            | EngineEvent::SessionRemoved { session_id } => session_id,
        }
    }
}

/// Broadcast fan-out for engine events
pub struct EventBus {
    tx: broadcast::Sender<EngineEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Publish without waiting; nobody listening is fine
    pub fn publish(&self, event: EngineEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = EventBus::default();
        bus.publish(EngineEvent::SessionRemoved {
            session_id: "gone".to_string(),
        });

        let mut rx = bus.subscribe();
        bus.publish(EngineEvent::SessionCreated {
            session_id: "s1".to_string(),
            kind: SessionKind::Dialogue,
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(event.session_id(), "s1");
    }

    #[test]
    fn test_event_serializes_tagged() {
        let json = serde_json::to_value(EngineEvent::SessionCreated {
            session_id: "s1".to_string(),
            kind: SessionKind::Interview,
        })
        .unwrap();
        assert_eq!(json["type"], "session_created");
        assert_eq!(json["kind"], "interview");
    }
}
