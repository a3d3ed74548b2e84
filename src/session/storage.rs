use super::SessionHandle;

/// Trait for session storage backends
pub trait SessionStore: Send + Sync {
    /// Start a new, empty session.
    fn create(&self) -> SessionHandle;

    /// Look up a live session. Expired sessions are not returned.
    fn get(&self, id: &str) -> Option<SessionHandle>;

    /// Discard a session; `false` when it did not exist.
    fn remove(&self, id: &str) -> bool;

    /// Drop every idle session past its expiry, returning how many went.
    fn purge_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
