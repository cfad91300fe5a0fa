// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

pub mod files;
pub mod health;
pub mod oauth;
pub mod pages;

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.server.max_upload_bytes;

    Router::new()
        .route("/", get(pages::index))
        .route("/oauth2callback", get(oauth::callback))
        .route("/dashboard", get(pages::dashboard))
        .route(
            "/upload",
            post(files::upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/delete/{file_id}", post(files::delete))
        .route("/download/{file_id}", get(files::download))
        .route("/logout", get(oauth::logout))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .with_state(state)
}
