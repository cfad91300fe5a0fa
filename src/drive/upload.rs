// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Temporary local copy of an upload.
//!
//! Incoming multipart data is written to a temp file in the upload
//! directory, then streamed from there to Drive. The temp file is owned by
//! exactly one value at a time:
//!
//! - [`UploadStager`] while bytes arrive
//! - [`StagedUpload`] once complete
//!
//! [`StagedUpload::release`] consumes the value, so the file cannot be
//! released twice. Dropping either value without releasing also deletes the
//! file, which covers early returns and panics.

use std::io;
use std::path::Path;

use tempfile::TempPath;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::warn;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

pub struct UploadStager {
    file: File,
    path: TempPath,
    original_name: String,
    mime_type: String,
    size_bytes: u64,
}

impl UploadStager {
    /// Create an empty temp file in `dir`.
    pub fn create(
        dir: &Path,
        original_name: impl Into<String>,
        mime_type: Option<String>,
    ) -> io::Result<Self> {
        let (file, path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(dir)?
            .into_parts();

        Ok(Self {
            file: File::from_std(file),
            path,
            original_name: original_name.into(),
            mime_type: mime_type
                .filter(|m| !m.trim().is_empty() && !m.chars().any(char::is_control))
                .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string()),
            size_bytes: 0,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.file.write_all(chunk).await?;
        self.size_bytes += chunk.len() as u64;
        Ok(())
    }

    /// Flush and close the temp file.
    pub async fn finish(mut self) -> io::Result<StagedUpload> {
        self.file.flush().await?;
        drop(self.file);

        Ok(StagedUpload {
            path: self.path,
            original_name: self.original_name,
            mime_type: self.mime_type,
            size_bytes: self.size_bytes,
        })
    }
}

/// Completed upload waiting to be sent to Drive.
pub struct StagedUpload {
    path: TempPath,
    original_name: String,
    mime_type: String,
    size_bytes: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Delete the temp file. Failure is logged, never propagated.
    pub fn release(self) {
        let path = self.path.to_path_buf();
        if let Err(e) = self.path.close() {
            warn!(path = %path.display(), error = %e, "Error deleting temp file");
        }
    }
}

impl std::fmt::Debug for StagedUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StagedUpload")
            .field("path", &self.path.display())
            .field("original_name", &self.original_name)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.size_bytes)
            .finish()
    }
}
