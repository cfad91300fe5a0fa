// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Sessions
//!
//! A session is the server-side record behind the browser's encrypted
//! session cookie. It owns at most one [`DelegatedCredential`]; nothing else
//! about the user is kept.
//!
//! - `store` - the [`SessionStore`] interface and its in-memory implementation
//! - `credentials` - [`CredentialStore`], the get/set/clear view over a session's credential
//! - `lifecycle` - [`SessionManager`], creation, idle expiry and destruction
//! - `cookies` - session cookie construction

pub mod cookies;
pub mod credentials;
pub mod lifecycle;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::DelegatedCredential;

pub use credentials::CredentialStore;
pub use lifecycle::SessionManager;
pub use store::{InMemorySessionStore, SessionStore};

/// Opaque session identifier carried in the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Server-side session record.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub credential: Option<DelegatedCredential>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::generate(),
            credential: None,
            created_at: now,
            last_seen_at: now,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    /// Whether the session has been unused for longer than `idle_ttl`.
    pub fn is_idle_at(&self, now: DateTime<Utc>, idle_ttl: chrono::Duration) -> bool {
        now - self.last_seen_at >= idle_ttl
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session named by the request no longer exists.
    #[error("session {0} does not exist")]
    Unknown(SessionId),

    /// The backing store failed.
    #[error("session store failure: {0}")]
    Store(String),
}
