// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated sessions.
//!
//! Use the `Authenticated` extractor in handlers of protected routes:
//!
//! ```rust,ignore
//! async fn dashboard(auth: Authenticated, State(state): State<AppState>) -> impl IntoResponse {
//!     let drive = state.drive.client_for(Some(&auth.credential))?;
//!     // ...
//! }
//! ```
//!
//! Rejection is [`AuthError`]; `Unauthenticated` renders as a redirect to `/`.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::Key;
use axum_extra::extract::PrivateCookieJar;

use super::credential::DelegatedCredential;
use super::error::AuthError;
use super::gate::AuthGate;
use crate::session::{cookies, SessionId};
use crate::state::AppState;

/// Session id and the (fresh) credential bound to it.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub session_id: SessionId,
    pub credential: DelegatedCredential,
}

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Extracted earlier in this request; skip a second store round trip.
        if let Some(auth) = parts.extensions.get::<Authenticated>().cloned() {
            return Ok(auth);
        }

        let jar = match PrivateCookieJar::<Key>::from_request_parts(parts, state).await {
            Ok(jar) => jar,
            Err(never) => match never {},
        };

        let session_id = cookies::session_id(&jar, &state.config.session.cookie_name)
            .ok_or(AuthError::Unauthenticated)?;

        let credential = AuthGate::new(&state.sessions, &state.oauth)
            .check(&session_id)
            .await?;

        let auth = Authenticated {
            session_id,
            credential,
        };
        parts.extensions.insert(auth.clone());
        Ok(auth)
    }
}
