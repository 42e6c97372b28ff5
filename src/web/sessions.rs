// src/web/sessions.rs
//! Interviews in progress, keyed by session id and owned by one user.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::interview::InterviewSession;

/// Sessions untouched for this long are dropped.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(4 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionLookupError {
    NotFound,
    NotOwner,
}

struct Entry {
    owner: String,
    last_seen: Instant,
    session: Arc<Mutex<InterviewSession>>,
}

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: InterviewSession) -> Arc<Mutex<InterviewSession>> {
        let id = session.id();
        let owner = session.user_id().to_string();
        let shared = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, e| e.last_seen.elapsed() < SESSION_IDLE_TIMEOUT);
        if sessions.len() < before {
            info!("Dropped {} idle interview sessions", before - sessions.len());
        }
        sessions.insert(
            id,
            Entry {
                owner,
                last_seen: Instant::now(),
                session: shared.clone(),
            },
        );
        shared
    }

    pub async fn get(
        &self,
        id: Uuid,
        user_id: &str,
    ) -> Result<Arc<Mutex<InterviewSession>>, SessionLookupError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(SessionLookupError::NotFound)?;
        if entry.owner != user_id {
            return Err(SessionLookupError::NotOwner);
        }
        entry.last_seen = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, id: Uuid, user_id: &str) -> Result<(), SessionLookupError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            None => Err(SessionLookupError::NotFound),
            Some(entry) if entry.owner != user_id => Err(SessionLookupError::NotOwner),
            Some(_) => {
                sessions.remove(&id);
                Ok(())
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::llm_client::DisabledGenerator;
    use crate::interview::{InterviewContext, InterviewSettings, QuestionBank};

    fn session(user: &str) -> InterviewSession {
        InterviewSession::new(
            user,
            InterviewContext::new("Software Engineer".into(), "Mid Level".into()),
            InterviewSettings::default(),
            Arc::new(QuestionBank::builtin().unwrap()),
            Arc::new(DisabledGenerator),
        )
    }

    #[tokio::test]
    async fn test_sessions_are_owned() {
        let store = SessionStore::new();
        let s = session("alice");
        let id = s.id();
        store.insert(s).await;

        assert!(store.get(id, "alice").await.is_ok());
        assert_eq!(
            store.get(id, "bob").await.err(),
            Some(SessionLookupError::NotOwner)
        );
        assert_eq!(
            store.get(Uuid::new_v4(), "alice").await.err(),
            Some(SessionLookupError::NotFound)
        );

        assert_eq!(store.remove(id, "bob").await, Err(SessionLookupError::NotOwner));
        assert_eq!(store.remove(id, "alice").await, Ok(()));
        assert_eq!(store.len().await, 0);
    }
}
