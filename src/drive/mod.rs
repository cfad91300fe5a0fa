// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Google Drive
//!
//! Thin adapter over the Drive v3 REST API, always acting with the
//! requesting user's delegated credential.
//!
//! - `client` - [`DriveService`] and the per-request [`DriveClient`]
//! - `upload` - temp-file staging for uploads ([`UploadStager`], [`StagedUpload`])
//! - `types` - wire types
//! - `error` - [`DriveError`], tagged with the failing [`DriveOperation`]

pub mod client;
pub mod error;
pub mod types;
pub mod upload;

pub use client::{DriveClient, DriveService};
pub use error::{DriveError, DriveOperation};
pub use types::{RemoteDownload, RemoteFile};
pub use upload::{StagedUpload, UploadStager};
