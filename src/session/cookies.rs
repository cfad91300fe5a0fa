// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Session cookie helpers.
//!
//! The cookie lives in a `PrivateCookieJar`, so its value (the session id)
//! is encrypted and authenticated with the server's cookie key.

use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::PrivateCookieJar;
use time::Duration;

use super::SessionId;

/// Build the session cookie for `id`.
///
/// A browser-session cookie with no `Max-Age`: idle expiry is decided by the
/// server-side record, which slides on every request.
pub fn session_cookie(name: &str, id: &SessionId, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .build()
}

/// Removal cookie for the session.
pub fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
}

/// Session id carried by the request, if the cookie is present and well formed.
pub fn session_id(jar: &PrivateCookieJar, name: &str) -> Option<SessionId> {
    jar.get(name).and_then(|c| c.value().parse().ok())
}
