// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::fmt;

/// Remote storage call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOperation {
    List,
    Upload,
    Delete,
    /// First half of a download: resolving the file name.
    Metadata,
    /// Second half of a download: fetching the bytes.
    Content,
}

impl DriveOperation {
    /// Message shown to the browser when this operation fails.
    pub fn user_message(self) -> &'static str {
        match self {
            DriveOperation::List => "Error fetching files from Google Drive",
            DriveOperation::Upload => "Error uploading the file.",
            DriveOperation::Delete => "Error deleting the file.",
            DriveOperation::Metadata => "Error fetching file metadata.",
            DriveOperation::Content => "Error downloading the file.",
        }
    }
}

impl fmt::Display for DriveOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DriveOperation::List => "files.list",
            DriveOperation::Upload => "files.create",
            DriveOperation::Delete => "files.delete",
            DriveOperation::Metadata => "files.get",
            DriveOperation::Content => "files.get(alt=media)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    /// No credential was supplied; the call was not attempted.
    #[error("no delegated credential bound to this request")]
    Unauthenticated,

    #[error("{operation} failed: file {file_id} not found")]
    NotFound {
        operation: DriveOperation,
        file_id: String,
    },

    /// Any other non-success outcome from the remote API, including transport errors.
    #[error("{operation} failed: {cause}")]
    Remote {
        operation: DriveOperation,
        cause: String,
    },

    /// The local copy of an upload could not be read.
    #[error("staged upload unreadable: {0}")]
    Staging(#[from] std::io::Error),
}

impl DriveError {
    pub fn remote(operation: DriveOperation, cause: impl fmt::Display) -> Self {
        DriveError::Remote {
            operation,
            cause: cause.to_string(),
        }
    }
}
