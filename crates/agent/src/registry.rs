//! Session registry
//!
//! Arena of live sessions keyed by opaque ids. The map sits behind a single
//! lock; each session has its own async mutex so calls on one session are
//! serialized while other sessions proceed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::Mutex as SessionLock;

use triage_config::RegistryConfig;

use crate::dialogue::DialogueSession;
use crate::events::SessionKind;
use crate::interview::StructuredInterview;
use crate::AgentError;

pub type SharedDialogue = Arc<SessionLock<DialogueSession>>;
pub type SharedInterview = Arc<SessionLock<StructuredInterview>>;

#[derive(Clone)]
enum SessionHandle {
    Dialogue(SharedDialogue),
    Interview(SharedInterview),
}

impl SessionHandle {
    fn kind(&self) -> SessionKind {
        match self {
            SessionHandle::Dialogue(_) => SessionKind::Dialogue,
            SessionHandle::Interview(_) => SessionKind::Interview,
        }
    }
}

struct Entry {
    handle: SessionHandle,
    last_activity: Instant,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, Entry>>,
    max_sessions: usize,
    idle_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionRegistry {
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: config.max_sessions.max(1),
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs.max(1)),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        self.cleanup_interval
    }

    /// Register a fresh dialogue session
    pub fn create_dialogue(&self) -> Result<(String, SharedDialogue), AgentError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(SessionLock::new(DialogueSession::new(id.clone())));
        self.insert(id.clone(), SessionHandle::Dialogue(session.clone()))?;
        Ok((id, session))
    }

    /// Register a fresh structured interview
    pub fn create_interview(
        &self,
        caller: Option<String>,
    ) -> Result<(String, SharedInterview), AgentError> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(SessionLock::new(StructuredInterview::new(id.clone(), caller)));
        self.insert(id.clone(), SessionHandle::Interview(session.clone()))?;
        Ok((id, session))
    }

    fn insert(&self, id: String, handle: SessionHandle) -> Result<(), AgentError> {
        let mut sessions = self.sessions.lock();

        if sessions.len() >= self.max_sessions {
            let expired = self.expire_locked(&mut sessions);
            if !expired.is_empty() {
                tracing::info!(count = expired.len(), "Evicted idle sessions to make room");
            }
            if sessions.len() >= self.max_sessions {
                return Err(AgentError::CapacityExceeded(self.max_sessions));
            }
        }

        tracing::info!(session_id = %id, kind = ?handle.kind(), "Created session");
        sessions.insert(
            id,
            Entry {
                handle,
                last_activity: Instant::now(),
            },
        );
        Ok(())
    }

    fn touch(&self, id: &str) -> Result<SessionHandle, AgentError> {
        let mut sessions = self.sessions.lock();
        let entry = sessions
            .get_mut(id)
            .ok_or_else(|| AgentError::SessionNotFound(id.to_string()))?;
        entry.last_activity = Instant::now();
        Ok(entry.handle.clone())
    }

    pub fn dialogue(&self, id: &str) -> Result<SharedDialogue, AgentError> {
        match self.touch(id)? {
            SessionHandle::Dialogue(session) => Ok(session),
            SessionHandle::Interview(_) => Err(AgentError::WrongSessionKind(id.to_string())),
        }
    }

    pub fn interview(&self, id: &str) -> Result<SharedInterview, AgentError> {
        match self.touch(id)? {
            SessionHandle::Interview(session) => Ok(session),
            SessionHandle::Dialogue(_) => Err(AgentError::WrongSessionKind(id.to_string())),
        }
    }

    pub fn kind(&self, id: &str) -> Option<SessionKind> {
        self.sessions.lock().get(id).map(|e| e.handle.kind())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.lock().contains_key(id)
    }

    /// Returns false when the id was unknown
    pub fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.lock().remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    pub fn count(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }

    /// Drop sessions idle longer than the timeout, returning their ids
    pub fn cleanup_expired(&self) -> Vec<String> {
        let mut sessions = self.sessions.lock();
        self.expire_locked(&mut sessions)
    }

    fn expire_locked(&self, sessions: &mut HashMap<String, Entry>) -> Vec<String> {
        let timeout = self.idle_timeout;
        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, e)| e.last_activity.elapsed() > timeout)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &expired {
            sessions.remove(id);
            tracing::info!(session_id = %id, "Expired idle session");
        }
        expired
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(&RegistryConfig::default())
    }
}
