// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session persistence interface and the in-memory store.
//!
//! The store is injected into [`SessionManager`](super::SessionManager) and
//! [`CredentialStore`](super::CredentialStore) as `Arc<dyn SessionStore>`;
//! no component reaches for sessions as ambient state.
//!
//! ## Concurrency
//!
//! Each call takes the map lock once. Read-modify-write sequences built on
//! `get` + `set` are not atomic: two requests mutating the same session
//! concurrently resolve last-write-wins. `delete` is a single removal, so a
//! session is either fully present or fully gone.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{Session, SessionError, SessionId};

#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Look up a session. Absence is `Ok(None)`, never an error.
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionError>;

    /// Insert or replace a session record.
    async fn set(&self, session: Session) -> Result<(), SessionError>;

    /// Remove a session. Returns whether a record was removed.
    async fn delete(&self, id: &SessionId) -> Result<bool, SessionError>;

    /// Remove every session last seen at or before `cutoff`. Returns the count removed.
    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, SessionError>;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.read().await.get(id).cloned())
    }

    async fn set(&self, session: Session) -> Result<(), SessionError> {
        self.sessions.write().await.insert(session.id, session);
        Ok(())
    }

    async fn delete(&self, id: &SessionId) -> Result<bool, SessionError> {
        Ok(self.sessions.write().await.remove(id).is_some())
    }

    async fn purge_idle(&self, cutoff: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.last_seen_at > cutoff);
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_set_delete() {
        let store = InMemorySessionStore::new();
        let session = Session::new(Utc::now());
        let id = session.id;

        assert!(store.get(&id).await.unwrap().is_none());

        store.set(session).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().unwrap().id, id);

        assert!(store.delete(&id).await.unwrap());
        assert!(!store.delete(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_are_isolated_by_id() {
        let store = InMemorySessionStore::new();
        let a = Session::new(Utc::now());
        let b = Session::new(Utc::now());
        let (a_id, b_id) = (a.id, b.id);
        store.set(a).await.unwrap();
        store.set(b).await.unwrap();

        store.delete(&a_id).await.unwrap();
        assert!(store.get(&a_id).await.unwrap().is_none());
        assert!(store.get(&b_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn purge_idle_drops_only_stale_sessions() {
        let store = InMemorySessionStore::new();
        let now = Utc::now();
        let stale = Session::new(now - chrono::Duration::hours(2));
        let fresh = Session::new(now);
        let fresh_id = fresh.id;
        store.set(stale).await.unwrap();
        store.set(fresh).await.unwrap();

        let removed = store
            .purge_idle(now - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(removed, 1);
        assert_eq!(store.len().await, 1);
        assert!(store.get(&fresh_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn purge_and_idle_check_agree_at_the_boundary() {
        let store = InMemorySessionStore::new();
        let ttl = chrono::Duration::hours(1);
        let now = Utc::now();
        let session = Session::new(now - ttl);
        assert!(session.is_idle_at(now, ttl));
        store.set(session).await.unwrap();

        assert_eq!(store.purge_idle(now - ttl).await.unwrap(), 1);
        assert_eq!(store.len().await, 0);
    }
}
