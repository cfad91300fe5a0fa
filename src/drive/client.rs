// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google Drive v3 REST client.
//!
//! [`DriveService`] holds the shared HTTP client and endpoint configuration.
//! A [`DriveClient`] borrows it together with one request's access token, so
//! every remote call is made on behalf of exactly one signed-in user.
//!
//! Each operation is a single remote call (a download is two: metadata, then
//! content). Nothing is retried and nothing is cached.

use std::io;

use axum::body::Bytes;
use futures_util::{future, stream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{DriveError, DriveOperation};
use super::types::{CreatedFile, FileList, FileMetadata, NewFileMetadata, RemoteDownload, RemoteFile};
use super::upload::StagedUpload;
use crate::auth::DelegatedCredential;
use crate::config::DriveConfig;

/// Fields requested from `files.list`.
const LIST_FIELDS: &str = "files(id,name,mimeType)";
/// Fields requested when resolving a download.
const METADATA_FIELDS: &str = "name,mimeType";

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

pub struct DriveService {
    http: reqwest::Client,
    api_base_url: String,
    upload_base_url: String,
    page_size: u32,
}

impl DriveService {
    pub fn new(config: &DriveConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_base_url: config.api_base_url.clone(),
            upload_base_url: config.upload_base_url.clone(),
            page_size: config.page_size,
        }
    }

    /// Listing page size used by the dashboard.
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Client acting with `credential`.
    ///
    /// # Errors
    ///
    /// [`DriveError::Unauthenticated`] when no usable credential is given.
    /// No remote call is attempted in that case.
    pub fn client_for(
        &self,
        credential: Option<&DelegatedCredential>,
    ) -> Result<DriveClient<'_>, DriveError> {
        let access_token = credential
            .map(|c| c.access_token.as_str())
            .filter(|token| !token.is_empty())
            .ok_or(DriveError::Unauthenticated)?;

        Ok(DriveClient {
            service: self,
            access_token: access_token.to_string(),
        })
    }
}

pub struct DriveClient<'a> {
    service: &'a DriveService,
    access_token: String,
}

impl DriveClient<'_> {
    /// First `page_size` files visible to the user, in provider order.
    pub async fn list(&self, page_size: u32) -> Result<Vec<RemoteFile>, DriveError> {
        let op = DriveOperation::List;
        let response = self
            .service
            .http
            .get(format!("{}/files", self.service.api_base_url))
            .query(&[
                ("pageSize", page_size.to_string().as_str()),
                ("fields", LIST_FIELDS),
            ])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::remote(op, e))?;

        let list: FileList = ensure_success(response, op, None)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::remote(op, e))?;

        debug!(count = list.files.len(), "Listed Drive files");
        Ok(list.files)
    }

    /// Create a file from a staged upload and return its id.
    ///
    /// The body is a `multipart/related` request: JSON metadata naming the
    /// file, then the raw content streamed from the temp file. The caller
    /// keeps ownership of `upload` and releases it whatever the outcome.
    pub async fn upload(&self, upload: &StagedUpload) -> Result<String, DriveError> {
        let op = DriveOperation::Upload;
        let file = tokio::fs::File::open(upload.path()).await?;

        let metadata = serde_json::to_string(&NewFileMetadata {
            name: upload.original_name(),
        })
        .map_err(|e| DriveError::remote(op, e))?;

        let boundary = format!("relay-{}", Uuid::new_v4().simple());
        let head = format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: {mime}\r\n\r\n",
            mime = upload.mime_type(),
        );
        let tail = format!("\r\n--{boundary}--\r\n");
        let content_length = head.len() as u64 + upload.size_bytes() + tail.len() as u64;

        let body = stream::once(future::ready(Ok::<_, io::Error>(Bytes::from(head))))
            .chain(ReaderStream::new(file))
            .chain(stream::once(future::ready(Ok(Bytes::from(tail)))));

        let response = self
            .service
            .http
            .post(format!("{}/files", self.service.upload_base_url))
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .bearer_auth(&self.access_token)
            .header(
                CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .header(CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body))
            .send()
            .await
            .map_err(|e| DriveError::remote(op, e))?;

        let created: CreatedFile = ensure_success(response, op, None)
            .await?
            .json()
            .await
            .map_err(|e| DriveError::remote(op, e))?;

        info!(
            file_id = %created.id,
            size_bytes = upload.size_bytes(),
            "Uploaded file to Drive"
        );
        Ok(created.id)
    }

    /// Permanently delete a file.
    pub async fn delete(&self, file_id: &str) -> Result<(), DriveError> {
        let op = DriveOperation::Delete;
        let response = self
            .service
            .http
            .delete(self.file_url(file_id))
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::remote(op, e))?;

        ensure_success(response, op, Some(file_id)).await?;
        info!(file_id = %file_id, "Deleted Drive file");
        Ok(())
    }

    /// Resolve the file's name, then open its content stream.
    ///
    /// The content response status is checked before returning, so a
    /// [`RemoteDownload`] always carries a stream from a successful response.
    pub async fn download(&self, file_id: &str) -> Result<RemoteDownload, DriveError> {
        let metadata = self.metadata(file_id).await?;

        let op = DriveOperation::Content;
        let response = self
            .service
            .http
            .get(self.file_url(file_id))
            .query(&[("alt", "media")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::remote(op, e))?;
        let response = ensure_success(response, op, Some(file_id)).await?;

        debug!(file_id = %file_id, "Streaming Drive file content");
        Ok(RemoteDownload {
            file_name: metadata.name,
            mime_type: metadata.mime_type,
            content_length: response.content_length(),
            content: response.bytes_stream().boxed(),
        })
    }

    async fn metadata(&self, file_id: &str) -> Result<FileMetadata, DriveError> {
        let op = DriveOperation::Metadata;
        let response = self
            .service
            .http
            .get(self.file_url(file_id))
            .query(&[("fields", METADATA_FIELDS)])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| DriveError::remote(op, e))?;

        ensure_success(response, op, Some(file_id))
            .await?
            .json()
            .await
            .map_err(|e| DriveError::remote(op, e))
    }

    fn file_url(&self, file_id: &str) -> String {
        format!(
            "{}/files/{}",
            self.service.api_base_url,
            urlencoding::encode(file_id)
        )
    }
}

/// Pass a successful response through; map anything else to a [`DriveError`].
async fn ensure_success(
    response: Response,
    operation: DriveOperation,
    file_id: Option<&str>,
) -> Result<Response, DriveError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if let (StatusCode::NOT_FOUND, Some(file_id)) = (status, file_id) {
        return Err(DriveError::NotFound {
            operation,
            file_id: file_id.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ApiErrorBody>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            format!("HTTP {}: {}", status.as_u16(), parsed.error.message)
        }
        _ => format!("HTTP {}", status.as_u16()),
    };
    Err(DriveError::remote(operation, detail))
}
