// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Drive v3 wire types.

use axum::body::Bytes;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// File as reported by `files.list`. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FileList {
    #[serde(default)]
    pub files: Vec<RemoteFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FileMetadata {
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedFile {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct NewFileMetadata<'a> {
    pub name: &'a str,
}

/// Content stream of a download, already checked for a success status.
pub type ContentStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Resolved file name plus its content stream.
pub struct RemoteDownload {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub content_length: Option<u64>,
    pub content: ContentStream,
}

impl std::fmt::Debug for RemoteDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDownload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}
