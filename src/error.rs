// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::auth::error::LOGIN_PATH;
use crate::drive::{DriveError, DriveOperation};
use crate::session::SessionError;

/// Handler error rendered as a short plain-text page, or as a redirect when
/// `location` is set.
///
/// Internal detail is logged where the error is converted and never sent to
/// the browser.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub location: Option<&'static str>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            location: None,
        }
    }

    /// `303 See Other` to `location`.
    pub fn redirect(location: &'static str) -> Self {
        Self {
            status: StatusCode::SEE_OTHER,
            message: String::new(),
            location: Some(location),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(location) = self.location {
            return Redirect::to(location).into_response();
        }
        (self.status, self.message).into_response()
    }
}

impl From<DriveError> for ApiError {
    fn from(err: DriveError) -> Self {
        match &err {
            DriveError::Unauthenticated => ApiError::redirect(LOGIN_PATH),
            DriveError::NotFound { .. } => {
                error!(error = %err, "Drive file not found");
                ApiError::not_found("File not found.")
            }
            DriveError::Remote { operation, .. } => {
                error!(error = %err, "Drive call failed");
                ApiError::internal(operation.user_message())
            }
            DriveError::Staging(_) => {
                error!(error = %err, "Staged upload unreadable");
                ApiError::internal(DriveOperation::Upload.user_message())
            }
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        error!(error = %err, "Session store failure");
        ApiError::internal("Internal error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let internal = ApiError::internal("oops");
        assert_eq!(internal.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn into_response_returns_plain_text_body() {
        let response = ApiError::bad_request("No file part").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()["content-type"],
            "text/plain; charset=utf-8"
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"No file part");
    }

    #[test]
    fn drive_failures_map_to_operation_messages() {
        let list: ApiError = DriveError::remote(DriveOperation::List, "HTTP 500").into();
        assert_eq!(list.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(list.message, "Error fetching files from Google Drive");

        let content: ApiError = DriveError::remote(DriveOperation::Content, "reset").into();
        assert_eq!(content.message, "Error downloading the file.");

        let staging: ApiError =
            DriveError::Staging(std::io::Error::other("gone")).into();
        assert_eq!(staging.message, "Error uploading the file.");
    }

    #[tokio::test]
    async fn missing_credential_redirects_to_sign_in() {
        let err: ApiError = DriveError::Unauthenticated.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[test]
    fn missing_file_is_not_found() {
        let err: ApiError = DriveError::NotFound {
            operation: DriveOperation::Delete,
            file_id: "x".into(),
        }
        .into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
