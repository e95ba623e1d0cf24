use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

/// Identifies one fetch issued for a dependency key (a workflow, a cascade,
/// a doctor's dashboard). Only the newest ticket per key may apply its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    pub key: String,
    pub sequence: u64,
}

#[derive(Clone, Default)]
pub struct RequestTracker {
    latest: Arc<Mutex<HashMap<String, u64>>>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn issue(&self, key: &str) -> RequestTicket {
        let mut latest = self.latest.lock().await;
        let sequence = latest.entry(key.to_string()).or_insert(0);
        *sequence += 1;
        RequestTicket {
            key: key.to_string(),
            sequence: *sequence,
        }
    }

    pub async fn is_current(&self, ticket: &RequestTicket) -> bool {
        let latest = self.latest.lock().await;
        let current = latest.get(&ticket.key).copied() == Some(ticket.sequence);
        if !current {
            debug!(
                "Discarding stale response for {} (ticket {})",
                ticket.key, ticket.sequence
            );
        }
        current
    }

    pub async fn forget(&self, key: &str) {
        self.latest.lock().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn only_latest_ticket_is_current() {
        let tracker = RequestTracker::new();
        let first = tracker.issue("workflow-1").await;
        let second = tracker.issue("workflow-1").await;

        assert!(second.sequence > first.sequence);
        assert!(!tracker.is_current(&first).await);
        assert!(tracker.is_current(&second).await);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let tracker = RequestTracker::new();
        let a = tracker.issue("a").await;
        let _b = tracker.issue("b").await;
        assert!(tracker.is_current(&a).await);
    }

    #[tokio::test]
    async fn forgotten_keys_have_no_current_ticket() {
        let tracker = RequestTracker::new();
        let a = tracker.issue("a").await;
        tracker.forget("a").await;
        assert!(!tracker.is_current(&a).await);
    }
}
