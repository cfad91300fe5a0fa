// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session lifecycle: create, resolve (with idle expiry) and destroy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{CredentialStore, Session, SessionError, SessionId, SessionStore};
use crate::auth::DelegatedCredential;

#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    idle_ttl: chrono::Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, idle_ttl: chrono::Duration) -> Self {
        Self { store, idle_ttl }
    }

    /// Credential view over the same backing store.
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(self.store.clone())
    }

    pub async fn create_session(&self) -> Result<SessionId, SessionError> {
        self.create_session_at(Utc::now()).await
    }

    pub(crate) async fn create_session_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<SessionId, SessionError> {
        self.insert_new(None, now).await
    }

    /// Create a session already bound to `credential`, in a single store write.
    ///
    /// Either the session exists with its credential or it was never created.
    pub async fn create_authenticated_session(
        &self,
        credential: DelegatedCredential,
    ) -> Result<SessionId, SessionError> {
        self.insert_new(Some(credential), Utc::now()).await
    }

    async fn insert_new(
        &self,
        credential: Option<DelegatedCredential>,
        now: DateTime<Utc>,
    ) -> Result<SessionId, SessionError> {
        let purged = self.store.purge_idle(now - self.idle_ttl).await?;
        if purged > 0 {
            debug!(purged, "Purged idle sessions");
        }

        let mut session = Session::new(now);
        session.credential = credential;
        let id = session.id;
        self.store.set(session).await?;
        info!(session_id = %id, "Session created");
        Ok(id)
    }

    /// Resolve a live session and mark it as seen.
    ///
    /// Idle sessions are destroyed and read as absent.
    pub async fn resolve(&self, id: &SessionId) -> Result<Option<Session>, SessionError> {
        self.resolve_at(id, Utc::now()).await
    }

    pub(crate) async fn resolve_at(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, SessionError> {
        let Some(mut session) = self.store.get(id).await? else {
            return Ok(None);
        };

        if session.is_idle_at(now, self.idle_ttl) {
            self.store.delete(id).await?;
            info!(session_id = %id, "Idle session expired");
            return Ok(None);
        }

        session.last_seen_at = now;
        self.store.set(session.clone()).await?;
        Ok(Some(session))
    }

    /// Destroy a session together with its credential.
    ///
    /// Destroying an unknown session succeeds.
    pub async fn destroy_session(&self, id: &SessionId) -> Result<(), SessionError> {
        if self.store.delete(id).await? {
            info!(session_id = %id, "Session destroyed");
        }
        Ok(())
    }
}
