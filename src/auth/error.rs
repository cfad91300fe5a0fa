// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};

use crate::session::SessionError;

/// Where unauthenticated browsers are sent to find the consent link.
pub const LOGIN_PATH: &str = "/";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No usable credential is bound to the request's session.
    #[error("Not authenticated")]
    Unauthenticated,

    /// Authorization code exchange failed; carries the provider's detail.
    #[error("Authorization code exchange failed: {0}")]
    Exchange(String),

    /// Refresh grant failed; carries the provider's detail.
    #[error("Token refresh failed: {0}")]
    Refresh(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthenticated => StatusCode::SEE_OTHER,
            AuthError::Exchange(_) | AuthError::Refresh(_) | AuthError::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Unauthenticated => Redirect::to(LOGIN_PATH).into_response(),
            AuthError::Exchange(ref detail) => {
                tracing::error!(error = %detail, "Error getting OAuth tokens");
                (self.status_code(), "Error authenticating with Google").into_response()
            }
            AuthError::Refresh(_) | AuthError::Session(_) => {
                tracing::error!(error = %self, "Authentication internal error");
                (self.status_code(), "Internal error").into_response()
            }
        }
    }
}
