// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store: the delegated credential bound to a session.
//!
//! The store performs no freshness validation; that is the gate's job.

use std::sync::Arc;

use super::{SessionError, SessionId, SessionStore};
use crate::auth::DelegatedCredential;

#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn SessionStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Credential bound to the session, if any. An unknown session reads as absent.
    pub async fn get(&self, id: &SessionId) -> Result<Option<DelegatedCredential>, SessionError> {
        Ok(self
            .store
            .get(id)
            .await?
            .and_then(|session| session.credential))
    }

    /// Bind `credential` to the session, replacing any previous one.
    pub async fn set(
        &self,
        id: &SessionId,
        credential: DelegatedCredential,
    ) -> Result<(), SessionError> {
        let mut session = self
            .store
            .get(id)
            .await?
            .ok_or(SessionError::Unknown(*id))?;
        session.credential = Some(credential);
        self.store.set(session).await
    }

    /// Unbind the credential. Clearing an unknown session is a no-op.
    pub async fn clear(&self, id: &SessionId) -> Result<(), SessionError> {
        match self.store.get(id).await? {
            Some(mut session) if session.credential.is_some() => {
                session.credential = None;
                self.store.set(session).await
            }
            _ => Ok(()),
        }
    }
}
