// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Delegated-access credential obtained from the consent flow.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Clock skew tolerance applied to token expiry (60 seconds).
pub const EXPIRY_LEEWAY: chrono::Duration = chrono::Duration::seconds(60);

/// Access + optional refresh token authorizing Drive calls for one user.
///
/// Owned exclusively by a session record. `Debug` never prints the tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct DelegatedCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scopes: BTreeSet<String>,
}

impl DelegatedCredential {
    /// Credential with only an access token and no known expiry.
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            scopes: BTreeSet::new(),
        }
    }

    /// Expired once `now` is within [`EXPIRY_LEEWAY`] of `expires_at`.
    ///
    /// A credential without an expiry never expires locally.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .map(|expires_at| expires_at - EXPIRY_LEEWAY <= now)
            .unwrap_or(false)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

impl fmt::Debug for DelegatedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedCredential")
            .field("access_token", &"<redacted>")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "<redacted>"),
            )
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Token endpoint response (authorization-code and refresh grants).
#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl TokenResponse {
    /// Convert into a credential issued at `issued_at`.
    ///
    /// Refresh grants usually omit `refresh_token` and `scope`; the values of
    /// `previous` are carried over in that case.
    pub fn into_credential(
        self,
        issued_at: DateTime<Utc>,
        previous: Option<&DelegatedCredential>,
    ) -> DelegatedCredential {
        let scopes = match self.scope.as_deref() {
            Some(scope) if !scope.trim().is_empty() => {
                scope.split_whitespace().map(str::to_string).collect()
            }
            _ => previous.map(|p| p.scopes.clone()).unwrap_or_default(),
        };

        DelegatedCredential {
            access_token: self.access_token,
            refresh_token: self
                .refresh_token
                .filter(|token| !token.is_empty())
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expires_at: self
                .expires_in
                .map(|secs| issued_at + chrono::Duration::seconds(secs)),
            scopes,
        }
    }
}
