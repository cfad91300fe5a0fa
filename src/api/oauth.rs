// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Consent callback and logout.

use axum::{
    extract::{Query, State},
    response::Redirect,
};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::auth::AuthError;
use crate::error::ApiError;
use crate::session::cookies;
use crate::state::AppState;

pub const DASHBOARD_PATH: &str = "/dashboard";

/// Query Google appends to the redirect URI.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Exchange the authorization code and sign the browser in.
///
/// A new session is created for the credential and the session named by the
/// incoming cookie, if any, is destroyed. On failure no session and no
/// cookie are created.
pub async fn callback(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<(PrivateCookieJar, Redirect), AuthError> {
    let code = match (query.error, query.code) {
        (Some(error), _) => {
            return Err(AuthError::Exchange(format!("consent denied: {error}")));
        }
        (None, Some(code)) if !code.is_empty() => code,
        (None, _) => return Err(AuthError::Exchange("missing authorization code".into())),
    };

    let credential = state.oauth.exchange_code(&code).await?;

    let sessions = &state.sessions;
    let session_id = sessions.create_authenticated_session(credential).await?;

    let cookie_name = &state.config.session.cookie_name;
    if let Some(previous) = cookies::session_id(&jar, cookie_name) {
        if let Err(e) = sessions.destroy_session(&previous).await {
            warn!(session_id = %previous, error = %e, "Error destroying previous session");
        }
    }

    info!(session_id = %session_id, "Signed in with Google");
    let jar = jar.add(cookies::session_cookie(
        cookie_name,
        &session_id,
        state.config.session.secure_cookies,
    ));
    Ok((jar, Redirect::to(DASHBOARD_PATH)))
}

/// Destroy the session and clear the cookie. Works without a session.
pub async fn logout(
    State(state): State<AppState>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), ApiError> {
    let cookie_name = &state.config.session.cookie_name;

    if let Some(session_id) = cookies::session_id(&jar, cookie_name) {
        state
            .sessions
            .destroy_session(&session_id)
            .await
            .map_err(|e| {
                error!(session_id = %session_id, error = %e, "Error logging out");
                ApiError::internal("Error logging out.")
            })?;
        info!(session_id = %session_id, "Signed out");
    }

    let jar = jar.remove(cookies::clear_session_cookie(cookie_name));
    Ok((jar, Redirect::to(crate::auth::error::LOGIN_PATH)))
}
