// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTML pages: the sign-in page and the file dashboard.

use axum::{extract::State, response::Html};

use crate::auth::Authenticated;
use crate::drive::RemoteFile;
use crate::error::ApiError;
use crate::state::AppState;

/// Sign-in page with the Google consent link.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let consent_url = state.oauth.consent_url(state.oauth.default_scopes());
    Html(render_index(consent_url.as_str()))
}

/// First page of the user's Drive files, with upload, download and delete controls.
pub async fn dashboard(
    auth: Authenticated,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    let files = state
        .drive
        .client_for(Some(&auth.credential))?
        .list(state.drive.page_size())
        .await?;

    Ok(Html(render_dashboard(&files)))
}

fn render_index(consent_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Google Drive</title>
</head>
<body>
  <h1>Google Drive</h1>
  <p><a href="{}">Sign in with Google</a></p>
</body>
</html>
"#,
        escape_html(consent_url)
    )
}

fn render_dashboard(files: &[RemoteFile]) -> String {
    let rows: String = if files.is_empty() {
        "    <li>No files found.</li>\n".to_string()
    } else {
        files.iter().map(render_file_row).collect()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Your Google Drive Files</title>
</head>
<body>
  <h1>Your Google Drive Files</h1>
  <form action="/upload" method="post" enctype="multipart/form-data">
    <input type="file" name="file" required>
    <button type="submit">Upload</button>
  </form>
  <ul>
{rows}  </ul>
  <p><a href="/logout">Logout</a></p>
</body>
</html>
"#
    )
}

fn render_file_row(file: &RemoteFile) -> String {
    let id = urlencoding::encode(&file.id);
    format!(
        concat!(
            "    <li>{name} <small>({mime})</small>\n",
            "      <a href=\"/download/{id}\">Download</a>\n",
            "      <form action=\"/delete/{id}\" method=\"post\" style=\"display:inline\">",
            "<button type=\"submit\">Delete</button></form>\n",
            "    </li>\n",
        ),
        name = escape_html(&file.name),
        mime = escape_html(&file.mime_type),
        id = escape_html(&id),
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
