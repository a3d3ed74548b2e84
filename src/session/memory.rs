use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::storage::SessionStore;
use super::{ChatSession, SessionHandle};

/// Process-local sessions keyed by a random id.
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<String, SessionHandle>>,
    expiry: Duration,
}

impl InMemorySessionStore {
    pub fn new(expiry_minutes: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            expiry: Duration::minutes(expiry_minutes),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Idle and past expiry. A session whose lock is held is busy, never idle.
    fn is_stale(&self, handle: &SessionHandle) -> bool {
        match handle.try_lock() {
            Ok(session) => session.is_expired(self.expiry),
            Err(_) => false,
        }
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> SessionHandle {
        self.purge_expired();
        let id = Uuid::new_v4().to_string();
        let handle = Arc::new(tokio::sync::Mutex::new(ChatSession::new(id.clone())));
        self.sessions().insert(id.clone(), Arc::clone(&handle));
        tracing::debug!(session_id = %id, "session created");
        handle
    }

    fn get(&self, id: &str) -> Option<SessionHandle> {
        let mut sessions = self.sessions();
        let handle = sessions.get(id).cloned()?;
        if self.is_stale(&handle) {
            sessions.remove(id);
            tracing::debug!(session_id = %id, "session expired");
            return None;
        }
        Some(handle)
    }

    fn remove(&self, id: &str) -> bool {
        self.sessions().remove(id).is_some()
    }

    fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions();
        let before = sessions.len();
        sessions.retain(|_, handle| !self.is_stale(handle));
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!(purged, "expired sessions removed");
        }
        purged
    }

    fn len(&self) -> usize {
        self.sessions().len()
    }
}
