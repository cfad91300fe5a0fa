// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared test fixtures: application state wired to a wiremock server, and
//! an in-memory fake of the Drive v3 endpoints used by the relay.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::Key;
use axum_extra::extract::PrivateCookieJar;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::auth::DelegatedCredential;
use crate::config::{
    AppConfig, DriveConfig, GoogleConfig, ServerConfig, SessionConfig, SESSION_COOKIE_NAME,
};
use crate::drive::DriveOperation;
use crate::session::{cookies, InMemorySessionStore, SessionId};
use crate::state::AppState;

/// Access token accepted by [`FakeDrive`].
pub const TOKEN: &str = "tok1";

pub fn drive_config(uri: &str) -> DriveConfig {
    DriveConfig {
        api_base_url: format!("{uri}/drive/v3"),
        upload_base_url: format!("{uri}/upload/drive/v3"),
        page_size: 20,
        http_timeout: Duration::from_secs(5),
    }
}

pub fn config(uri: &str, upload_dir: &Path) -> AppConfig {
    AppConfig {
        google: GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "secret-456".into(),
            redirect_uri: "http://localhost:5000/oauth2callback".parse().unwrap(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".parse().unwrap(),
            token_url: format!("{uri}/token").parse().unwrap(),
            scopes: vec!["https://www.googleapis.com/auth/drive".into()],
        },
        drive: drive_config(uri),
        session: SessionConfig {
            cookie_name: SESSION_COOKIE_NAME.into(),
            idle_ttl: chrono::Duration::hours(1),
            secure_cookies: false,
        },
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            tls: None,
            upload_dir: upload_dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
        },
    }
}

/// State pointing every remote endpoint at `uri`. The returned directory is
/// the upload directory and must outlive the state.
pub fn state(uri: &str) -> (AppState, TempDir) {
    let dir = TempDir::new().unwrap();
    let state = AppState::new(
        config(uri, dir.path()),
        Arc::new(InMemorySessionStore::new()),
        Key::generate(),
    )
    .unwrap();
    (state, dir)
}

/// Create a session bound to `token` and return it with a `Cookie` header
/// value that the state's cookie key will accept.
pub async fn signed_in(state: &AppState, token: &str) -> (SessionId, String) {
    let id = state
        .sessions
        .create_authenticated_session(DelegatedCredential::bearer(token))
        .await
        .unwrap();
    (id, cookie_header(state, &id))
}

/// Encrypted `name=value` pair for `id`, as a browser would send it back.
pub fn cookie_header(state: &AppState, id: &SessionId) -> String {
    let jar = PrivateCookieJar::new(state.cookie_key.clone()).add(cookies::session_cookie(
        &state.config.session.cookie_name,
        id,
        false,
    ));
    let response = (jar, ()).into_response();
    let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

#[derive(Default)]
struct FakeDriveInner {
    files: Vec<StoredFile>,
    next_id: u64,
    failing: Vec<DriveOperation>,
}

/// Stateful stand-in for Drive: uploads are recorded and then served by
/// list, metadata, media and delete. Requests must carry `Bearer tok1`.
#[derive(Clone, Default)]
pub struct FakeDrive {
    inner: Arc<Mutex<FakeDriveInner>>,
}

impl FakeDrive {
    /// Start a mock server with the fake mounted on the Drive paths.
    pub async fn start() -> (MockServer, FakeDrive) {
        let server = MockServer::start().await;
        let fake = FakeDrive::default();
        fake.mount(&server).await;
        (server, fake)
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(path_regex(r"^(/upload)?/drive/v3/files"))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    pub fn insert(&self, name: &str, mime_type: &str, content: &[u8]) -> String {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let id = format!("gen-{}", inner.next_id);
        inner.files.push(StoredFile {
            id: id.clone(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
            content: content.to_vec(),
        });
        id
    }

    pub fn files(&self) -> Vec<StoredFile> {
        self.inner.lock().unwrap().files.clone()
    }

    /// Make every subsequent call of `operation` answer 500.
    pub fn fail(&self, operation: DriveOperation) {
        self.inner.lock().unwrap().failing.push(operation);
    }

    fn failing(&self, operation: DriveOperation) -> bool {
        self.inner.lock().unwrap().failing.contains(&operation)
    }
}

fn api_error(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "error": { "code": status, "message": message }
    }))
}

impl Respond for FakeDrive {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let expected = format!("Bearer {TOKEN}");
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            == Some(expected.as_str());
        if !authorized {
            return api_error(401, "Invalid Credentials");
        }

        let path = request.url.path();
        let method = request.method.as_str();

        if path == "/upload/drive/v3/files" && method == "POST" {
            return self.create(request);
        }
        if path == "/drive/v3/files" && method == "GET" {
            return self.list(request);
        }

        let Some(raw_id) = path.strip_prefix("/drive/v3/files/") else {
            return api_error(404, "Not Found");
        };
        let file_id = urlencoding::decode(raw_id).unwrap().into_owned();
        let media = request
            .url
            .query_pairs()
            .any(|(k, v)| k == "alt" && v == "media");

        match (method, media) {
            ("GET", true) => self.content(&file_id),
            ("GET", false) => self.metadata(&file_id),
            ("DELETE", _) => self.delete(&file_id),
            _ => api_error(405, "Method Not Allowed"),
        }
    }
}

impl FakeDrive {
    fn list(&self, request: &Request) -> ResponseTemplate {
        if self.failing(DriveOperation::List) {
            return api_error(500, "Backend Error");
        }
        let page_size = request
            .url
            .query_pairs()
            .find(|(k, _)| k == "pageSize")
            .and_then(|(_, v)| v.parse::<usize>().ok())
            .unwrap_or(100);

        let files: Vec<_> = self
            .files()
            .into_iter()
            .take(page_size)
            .map(|f| json!({ "id": f.id, "name": f.name, "mimeType": f.mime_type }))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "files": files }))
    }

    fn create(&self, request: &Request) -> ResponseTemplate {
        if self.failing(DriveOperation::Upload) {
            return api_error(500, "Backend Error");
        }
        let Some((name, mime_type, content)) = parse_related(request) else {
            return api_error(400, "Malformed multipart body");
        };
        let id = self.insert(&name, &mime_type, &content);
        ResponseTemplate::new(200).set_body_json(json!({ "id": id }))
    }

    fn metadata(&self, file_id: &str) -> ResponseTemplate {
        if self.failing(DriveOperation::Metadata) {
            return api_error(500, "Backend Error");
        }
        match self.find(file_id) {
            Some(f) => ResponseTemplate::new(200)
                .set_body_json(json!({ "name": f.name, "mimeType": f.mime_type })),
            None => api_error(404, &format!("File not found: {file_id}.")),
        }
    }

    fn content(&self, file_id: &str) -> ResponseTemplate {
        if self.failing(DriveOperation::Content) {
            return api_error(500, "Backend Error");
        }
        match self.find(file_id) {
            Some(f) => ResponseTemplate::new(200).set_body_raw(f.content, &f.mime_type),
            None => api_error(404, &format!("File not found: {file_id}.")),
        }
    }

    fn delete(&self, file_id: &str) -> ResponseTemplate {
        if self.failing(DriveOperation::Delete) {
            return api_error(500, "Backend Error");
        }
        let mut inner = self.inner.lock().unwrap();
        let before = inner.files.len();
        inner.files.retain(|f| f.id != file_id);
        if inner.files.len() == before {
            api_error(404, &format!("File not found: {file_id}."))
        } else {
            ResponseTemplate::new(204)
        }
    }

    fn find(&self, file_id: &str) -> Option<StoredFile> {
        self.files().into_iter().find(|f| f.id == file_id)
    }
}

/// Split a `multipart/related` upload into (name, media type, content).
fn parse_related(request: &Request) -> Option<(String, String, Vec<u8>)> {
    let content_type = request.headers.get("content-type")?.to_str().ok()?;
    let boundary = content_type.split("boundary=").nth(1)?.trim();
    let delimiter = format!("--{boundary}").into_bytes();

    let parts = split(&request.body, &delimiter);
    // preamble, metadata, media, closing "--"
    if parts.len() != 4 {
        return None;
    }

    let (_, metadata) = part(parts[1])?;
    let metadata: serde_json::Value = serde_json::from_slice(metadata).ok()?;
    let name = metadata.get("name")?.as_str()?.to_string();

    let (headers, content) = part(parts[2])?;
    let mime_type = headers
        .lines()
        .find_map(|line| line.strip_prefix("Content-Type: "))?
        .to_string();

    Some((name, mime_type, content.to_vec()))
}

fn split<'a>(body: &'a [u8], delimiter: &[u8]) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i + delimiter.len() <= body.len() {
        if &body[i..i + delimiter.len()] == delimiter {
            parts.push(&body[start..i]);
            i += delimiter.len();
            start = i;
        } else {
            i += 1;
        }
    }
    parts.push(&body[start..]);
    parts
}

/// Headers and body of one part, without the surrounding CRLFs.
fn part(raw: &[u8]) -> Option<(String, &[u8])> {
    let raw = raw.strip_prefix(b"\r\n")?;
    let raw = raw.strip_suffix(b"\r\n")?;
    let split_at = raw.windows(4).position(|w| w == b"\r\n\r\n")?;
    let headers = String::from_utf8(raw[..split_at].to_vec()).ok()?;
    Some((headers, &raw[split_at + 4..]))
}
