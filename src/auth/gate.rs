// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate.
//!
//! Decides per request whether the session carries a usable credential.
//! An expired credential is refreshed silently; if that is impossible or
//! fails, the credential is unbound and the request is sent back to the
//! consent flow.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::credential::DelegatedCredential;
use super::error::AuthError;
use super::oauth::OAuthClient;
use crate::session::{SessionId, SessionManager};

pub struct AuthGate<'a> {
    sessions: &'a SessionManager,
    oauth: &'a OAuthClient,
}

impl<'a> AuthGate<'a> {
    pub fn new(sessions: &'a SessionManager, oauth: &'a OAuthClient) -> Self {
        Self { sessions, oauth }
    }

    /// Credential for the session, refreshed if it has expired.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unauthenticated`] when the session is missing, idle, has
    /// no credential, or its credential can no longer be refreshed.
    /// [`AuthError::Session`] when the session store fails.
    pub async fn check(&self, session_id: &SessionId) -> Result<DelegatedCredential, AuthError> {
        self.check_at(session_id, Utc::now()).await
    }

    pub(crate) async fn check_at(
        &self,
        session_id: &SessionId,
        now: DateTime<Utc>,
    ) -> Result<DelegatedCredential, AuthError> {
        let session = self
            .sessions
            .resolve_at(session_id, now)
            .await?
            .ok_or(AuthError::Unauthenticated)?;

        let credential = session
            .credential
            .filter(|c| !c.access_token.trim().is_empty())
            .ok_or(AuthError::Unauthenticated)?;
        if !credential.is_expired_at(now) {
            return Ok(credential);
        }

        let credentials = self.sessions.credentials();
        match self.oauth.refresh(&credential).await {
            Ok(fresh) => {
                credentials.set(session_id, fresh.clone()).await?;
                info!(session_id = %session_id, "Access token refreshed");
                Ok(fresh)
            }
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Expired credential could not be refreshed");
                credentials.clear(session_id).await?;
                Err(AuthError::Unauthenticated)
            }
        }
    }
}
