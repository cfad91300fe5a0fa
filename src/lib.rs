// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drive Relay - browser front end for a user's Google Drive
//!
//! This crate signs a browser in with Google OAuth 2.0 and relays list,
//! upload, download and delete calls to the Drive v3 API on the user's
//! behalf. Tokens stay on the server, bound to a session that the browser
//! only knows through an encrypted cookie.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers (Axum)
//! - `auth` - OAuth consent flow, delegated credentials and the auth gate
//! - `drive` - Google Drive v3 client and upload staging
//! - `session` - Session store, credential store and session lifecycle

pub mod api;
pub mod auth;
pub mod config;
pub mod drive;
pub mod error;
pub mod session;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
