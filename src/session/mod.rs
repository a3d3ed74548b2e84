mod memory;
mod storage;

pub use memory::InMemorySessionStore;
pub use storage::SessionStore;

use crate::models::Message;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// One client's conversation. History lives only as long as the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub messages: Vec<Message>,
    pub last_updated: DateTime<Utc>,
}

/// Shared handle; holding the lock means a query is running on this session.
pub type SessionHandle = Arc<Mutex<ChatSession>>;

impl ChatSession {
    pub fn new(id: String) -> Self {
        Self {
            id,
            messages: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    pub fn is_expired(&self, expiry: Duration) -> bool {
        Utc::now().signed_duration_since(self.last_updated) >= expiry
    }
}
