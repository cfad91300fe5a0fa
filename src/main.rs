// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{env, sync::Arc, time::Duration};

use axum_extra::extract::cookie::Key;
use axum_server::tls_rustls::RustlsConfig;
use drive_relay::{
    api::router,
    config::{AppConfig, COOKIE_KEY_ENV, LOG_FORMAT_ENV},
    session::InMemorySessionStore,
    state::AppState,
};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let json = env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

/// Cookie key from `COOKIE_KEY`, or a random one that dies with the process.
fn load_cookie_key() -> Key {
    match env::var(COOKIE_KEY_ENV) {
        Ok(raw) => Key::try_from(raw.as_bytes()).expect("COOKIE_KEY must be at least 64 bytes"),
        Err(_) => {
            warn!("COOKIE_KEY not set; sessions will not survive a restart");
            Key::generate()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[tokio::main]
async fn main() {
    setup_logging();

    // Install the ring crypto provider for rustls (must be done before any TLS operations)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = AppConfig::from_env().expect("Invalid configuration");
    let addr = config
        .server
        .bind_addr()
        .expect("Failed to parse bind address");
    let tls = config.server.tls.clone();

    std::fs::create_dir_all(&config.server.upload_dir).expect("Failed to create upload directory");

    let state = AppState::new(
        config,
        Arc::new(InMemorySessionStore::new()),
        load_cookie_key(),
    )
    .expect("Failed to build HTTP client");
    let app = router(state);

    let handle = axum_server::Handle::new();
    tokio::spawn({
        let handle = handle.clone();
        async move {
            shutdown_signal().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match tls {
        Some(paths) => {
            let tls_config = RustlsConfig::from_pem_file(&paths.cert, &paths.key)
                .await
                .expect("Failed to load TLS certificate and key");

            info!(%addr, "Drive relay listening on https");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTPS server failed");
        }
        None => {
            info!(%addr, "Drive relay listening on http");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .expect("HTTP server failed");
        }
    }

    info!("Server stopped");
}
