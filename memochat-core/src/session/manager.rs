//! Session manager for handling multiple sessions

use super::store::Session;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// A session shared between request handlers.
///
/// The async mutex is held across a whole generation call, so turns from
/// concurrent requests on the same session never interleave.
pub type SharedSession = Arc<tokio::sync::Mutex<Session>>;

/// In-memory registry of conversation sessions, one per session id.
///
/// Nothing is written to disk; every session is gone when the process exits.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<String, SharedSession>>,
}

impl SessionManager {
    /// Create an empty session manager
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh random session id. Nothing is stored until the id is used.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Create a session under a fresh random id
    pub fn create(&self) -> (String, SharedSession) {
        let id = Self::new_id();
        let session = self.get_or_create(&id);
        (id, session)
    }

    /// Get or create a session
    pub fn get_or_create(&self, id: &str) -> SharedSession {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session = %id, "Creating session");
                Arc::new(tokio::sync::Mutex::new(Session::new(id)))
            })
            .clone()
    }

    /// Get a session if it exists
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        self.sessions.lock().get(id).cloned()
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.lock().remove(id).is_some()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Turn;

    #[tokio::test]
    async fn test_get_or_create_returns_same_session() {
        let manager = SessionManager::new();
        let first = manager.get_or_create("abc");
        first.lock().await.append(Turn::user("Hello"));

        let again = manager.get_or_create("abc");
        assert_eq!(again.lock().await.len(), 1);
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new();
        let (id_a, a) = manager.create();
        let (id_b, b) = manager.create();
        assert_ne!(id_a, id_b);

        a.lock().await.append(Turn::user("only in a"));

        assert_eq!(a.lock().await.len(), 1);
        assert!(b.lock().await.is_empty());
    }

    #[test]
    fn test_new_id_does_not_register_session() {
        let manager = SessionManager::new();
        let id = SessionManager::new_id();

        assert_ne!(id, SessionManager::new_id());
        assert!(manager.get(&id).is_none());
        assert!(manager.is_empty());
    }

    #[test]
    fn test_remove_session() {
        let manager = SessionManager::new();
        let (id, _) = manager.create();

        assert!(manager.get(&id).is_some());
        assert!(manager.remove(&id));
        assert!(!manager.remove(&id));
        assert!(manager.get(&id).is_none());
        assert!(manager.is_empty());
    }
}
