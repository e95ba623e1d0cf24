use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use shared_models::session::{NewSession, SessionContext};

/// Sessions not used for this long are dropped.
pub const SESSION_IDLE_TIMEOUT_HOURS: i64 = 24;

#[derive(Debug, Clone)]
struct StoredSession {
    context: SessionContext,
    last_seen: DateTime<Utc>,
}

impl StoredSession {
    fn is_idle(&self, now: DateTime<Utc>) -> bool {
        now - self.last_seen >= Duration::hours(SESSION_IDLE_TIMEOUT_HOURS)
    }
}

/// Server-side session storage. Identity is only ever read through
/// `load`, never from ambient state.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, StoredSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, new_session: NewSession) -> SessionContext {
        let session = SessionContext {
            session_id: Uuid::new_v4().to_string(),
            user_id: new_session.user_id,
            user_name: new_session.user_name,
            role_id: new_session.role_id,
            auth_token: new_session.auth_token,
            remembered_phone: new_session.remembered_phone,
            created_at: Utc::now(),
        };

        let now = session.created_at;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, stored| !stored.is_idle(now));
        if sessions.len() < before {
            debug!("Dropped {} idle sessions", before - sessions.len());
        }
        sessions.insert(
            session.session_id.clone(),
            StoredSession {
                context: session.clone(),
                last_seen: now,
            },
        );

        info!("Session created for user {} (role {})", session.user_id, session.role_id);
        session
    }

    /// Each successful load counts as activity.
    pub async fn load(&self, session_id: &str) -> Option<SessionContext> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let stored = sessions.get_mut(session_id)?;
        if stored.is_idle(now) {
            debug!("Session for user {} expired", stored.context.user_id);
            sessions.remove(session_id);
            return None;
        }
        stored.last_seen = now;
        Some(stored.context.clone())
    }

    pub async fn clear(&self, session_id: &str) -> Option<SessionContext> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.remove(session_id).map(|stored| stored.context);
        if let Some(ref session) = removed {
            debug!("Session cleared for user {}", session.user_id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_session() -> NewSession {
        NewSession {
            user_id: "17".to_string(),
            user_name: "Asha".to_string(),
            role_id: "1".to_string(),
            auth_token: "backend-token".to_string(),
            remembered_phone: None,
        }
    }

    #[tokio::test]
    async fn create_load_clear_lifecycle() {
        let store = SessionStore::new();
        let session = store.create(new_session()).await;

        let loaded = store.load(&session.session_id).await.unwrap();
        assert_eq!(loaded.user_id, "17");
        assert_eq!(store.len().await, 1);

        assert!(store.clear(&session.session_id).await.is_some());
        assert!(store.load(&session.session_id).await.is_none());
        assert!(store.is_empty().await);
    }

    async fn age(store: &SessionStore, session_id: &str, hours: i64) {
        let mut sessions = store.sessions.write().await;
        let stored = sessions.get_mut(session_id).unwrap();
        stored.last_seen -= Duration::hours(hours);
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let store = SessionStore::new();
        let session = store.create(new_session()).await;
        age(&store, &session.session_id, SESSION_IDLE_TIMEOUT_HOURS).await;

        assert!(store.load(&session.session_id).await.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn creating_a_session_sweeps_idle_ones() {
        let store = SessionStore::new();
        let idle = store.create(new_session()).await;
        let active = store.create(new_session()).await;
        age(&store, &idle.session_id, SESSION_IDLE_TIMEOUT_HOURS + 1).await;
        age(&store, &active.session_id, SESSION_IDLE_TIMEOUT_HOURS - 1).await;

        let fresh = store.create(new_session()).await;
        assert_eq!(store.len().await, 2);
        assert!(store.load(&active.session_id).await.is_some());
        assert!(store.load(&fresh.session_id).await.is_some());
    }

    #[tokio::test]
    async fn loading_keeps_a_session_alive() {
        let store = SessionStore::new();
        let session = store.create(new_session()).await;
        age(&store, &session.session_id, SESSION_IDLE_TIMEOUT_HOURS - 1).await;

        assert!(store.load(&session.session_id).await.is_some());
        age(&store, &session.session_id, 2).await;
        assert!(store.load(&session.session_id).await.is_some());
    }
}
