// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::auth::OAuthClient;
use crate::config::AppConfig;
use crate::drive::DriveService;
use crate::session::{SessionManager, SessionStore};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Service handles shared by every request. Immutable after startup; all
/// per-user state lives in the session store.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: SessionManager,
    pub oauth: Arc<OAuthClient>,
    pub drive: Arc<DriveService>,
    pub cookie_key: Key,
}

impl AppState {
    /// Wire up the service handles around `store`.
    ///
    /// One `reqwest::Client` is shared by the OAuth and Drive clients so the
    /// connection pool and the outbound timeouts apply to both. The read
    /// timeout bounds each wait on the remote, not a whole transfer.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn SessionStore>,
        cookie_key: Key,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .read_timeout(config.drive.http_timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let sessions = SessionManager::new(store, config.session.idle_ttl);
        let oauth = Arc::new(OAuthClient::new(config.google.clone(), http.clone()));
        let drive = Arc::new(DriveService::new(&config.drive, http));

        Ok(Self {
            config: Arc::new(config),
            sessions,
            oauth,
            drive,
            cookie_key,
        })
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
