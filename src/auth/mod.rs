// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Google OAuth 2.0 delegated access for the relay.
//!
//! ## Auth Flow
//!
//! 1. `/` renders a consent link built by [`OAuthClient::consent_url`]
//!    (`access_type=offline`, so Google issues a refresh token)
//! 2. Google redirects back to `/oauth2callback?code=...`
//! 3. The code is exchanged for a [`DelegatedCredential`], a fresh session is
//!    created and the credential is bound to it
//! 4. Protected routes use the [`Authenticated`] extractor, which runs the
//!    [`AuthGate`]: no credential means a redirect to `/`; an expired one is
//!    refreshed once, and a failed refresh unbinds it
//!
//! ## Security
//!
//! - Tokens never leave the server; the browser only holds an encrypted
//!   session id cookie
//! - Tokens are redacted from `Debug` output and never logged
//! - Token expiry tolerance is 60 seconds

pub mod credential;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod oauth;

pub use credential::DelegatedCredential;
pub use error::AuthError;
pub use extractor::Authenticated;
pub use gate::AuthGate;
pub use oauth::OAuthClient;
