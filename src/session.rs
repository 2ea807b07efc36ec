//! In-memory chat history, keyed by session id.
//!
//! State lives for the lifetime of the process; there is no persistence and
//! no retention bound. The store is a cheap-to-clone handle that gets injected
//! into the request handlers rather than living in a global.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// One recorded user/agent message pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_message: String,
    pub agent_response: String,
    pub timestamp: String,
    pub product_name: Option<String>,
}

/// Append-only session log. Appends from concurrent requests land in arrival
/// order; the mutex guards the map, not any cross-request ordering.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<String, Vec<Exchange>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends to the session, creating it if this is its first exchange.
    pub async fn append(&self, session_id: &str, exchange: Exchange) {
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(exchange);
    }

    /// Returns the session's exchanges in order, or empty if it was never used.
    pub async fn get(&self, session_id: &str) -> Vec<Exchange> {
        let sessions = self.sessions.lock().await;
        sessions.get(session_id).cloned().unwrap_or_default()
    }

    /// Removes the session entirely. No-op when it does not exist.
    pub async fn clear(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(session_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exchange(user: &str, agent: &str) -> Exchange {
        Exchange {
            user_message: user.to_string(),
            agent_response: agent.to_string(),
            timestamp: "2025-01-01T00:00:00Z".to_string(),
            product_name: None,
        }
    }

    #[tokio::test]
    async fn append_preserves_arrival_order() {
        let store = SessionStore::new();
        store.append("default", exchange("first", "a")).await;
        store.append("default", exchange("second", "b")).await;

        let history = store.get("default").await;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "first");
        assert_eq!(history[1].user_message, "second");
    }

    #[tokio::test]
    async fn get_unknown_session_is_empty() {
        let store = SessionStore::new();
        assert!(store.get("never-used").await.is_empty());
    }

    #[tokio::test]
    async fn clear_then_get_is_empty() {
        let store = SessionStore::new();
        store.append("default", exchange("hello", "hi")).await;
        store.clear("default").await;
        assert!(store.get("default").await.is_empty());
    }

    #[tokio::test]
    async fn clear_unknown_session_is_a_noop() {
        let store = SessionStore::new();
        store.clear("never-used").await;
        assert!(store.get("never-used").await.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let store = SessionStore::new();
        store.append("a", exchange("for a", "x")).await;
        store.append("b", exchange("for b", "y")).await;
        store.clear("a").await;

        assert!(store.get("a").await.is_empty());
        assert_eq!(store.get("b").await.len(), 1);
    }
}
