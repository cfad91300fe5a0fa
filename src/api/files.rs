// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! File operations: upload, delete and download.

use std::io;
use std::path::Path as FsPath;

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use super::oauth::DASHBOARD_PATH;
use crate::auth::Authenticated;
use crate::drive::upload::DEFAULT_MIME_TYPE;
use crate::drive::{DriveError, StagedUpload, UploadStager};
use crate::error::ApiError;
use crate::state::AppState;

/// Multipart field carrying the upload.
pub const FILE_FIELD: &str = "file";

/// Stage the `file` field locally, send it to Drive, then release the copy.
///
/// The temp file is released whatever the outcome of the remote call.
pub async fn upload(
    auth: Authenticated,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    let drive = state.drive.client_for(Some(&auth.credential))?;
    let staged = stage_file_field(&mut multipart, &state.config.server.upload_dir).await?;

    let result = drive.upload(&staged).await;
    staged.release();
    result?;

    Ok(Redirect::to(DASHBOARD_PATH))
}

pub async fn delete(
    auth: Authenticated,
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Redirect, ApiError> {
    state
        .drive
        .client_for(Some(&auth.credential))?
        .delete(&file_id)
        .await?;

    Ok(Redirect::to(DASHBOARD_PATH))
}

/// Stream a file back as an attachment under its Drive name.
///
/// Headers are only sent once both the metadata and the content call
/// succeeded.
pub async fn download(
    auth: Authenticated,
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> Result<Response, ApiError> {
    let download = state
        .drive
        .client_for(Some(&auth.credential))?
        .download(&file_id)
        .await?;

    let mut headers = HeaderMap::new();
    let content_type = download
        .mime_type
        .as_deref()
        .and_then(|m| HeaderValue::from_str(m).ok())
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_MIME_TYPE));
    headers.insert(CONTENT_TYPE, content_type);
    headers.insert(
        CONTENT_DISPOSITION,
        attachment_disposition(&download.file_name),
    );
    if let Some(length) = download.content_length {
        headers.insert(CONTENT_LENGTH, HeaderValue::from(length));
    }

    Ok((headers, Body::from_stream(download.content)).into_response())
}

/// Copy the first `file` field into a temp file under `dir`.
async fn stage_file_field(
    multipart: &mut Multipart,
    dir: &FsPath,
) -> Result<StagedUpload, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ApiError::bad_request("No selected file"))?;
        let mime_type = field.content_type().map(str::to_string);

        let mut stager = UploadStager::create(dir, file_name, mime_type).map_err(staging_error)?;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            stager.write_chunk(&chunk).await.map_err(staging_error)?;
        }
        return stager.finish().await.map_err(staging_error);
    }

    Err(ApiError::bad_request("No file part"))
}

fn multipart_error(err: MultipartError) -> ApiError {
    warn!(error = %err, "Rejected multipart upload");
    ApiError::new(err.status(), err.body_text())
}

fn staging_error(err: io::Error) -> ApiError {
    DriveError::Staging(err).into()
}

/// `Content-Disposition` naming the download.
///
/// `filename` is an ASCII fallback with quotes and backslashes escaped;
/// `filename*` carries the exact name, UTF-8 and percent-encoded.
pub fn attachment_disposition(file_name: &str) -> HeaderValue {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' => "\\\"".to_string(),
            '\\' => "\\\\".to_string(),
            c if c.is_ascii() && !c.is_ascii_control() => c.to_string(),
            _ => "_".to_string(),
        })
        .collect();

    let value = format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(file_name)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
