// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values and the
//! typed [`AppConfig`] assembled from them at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `GOOGLE_CLIENT_ID` | OAuth client id | Required |
//! | `GOOGLE_CLIENT_SECRET` | OAuth client secret | Required |
//! | `GOOGLE_REDIRECT_URI` | Registered OAuth redirect URI | `http://localhost:5000/oauth2callback` |
//! | `GOOGLE_AUTH_URL` | Authorization endpoint | `https://accounts.google.com/o/oauth2/v2/auth` |
//! | `GOOGLE_TOKEN_URL` | Token endpoint | `https://oauth2.googleapis.com/token` |
//! | `DRIVE_API_BASE_URL` | Drive v3 metadata API | `https://www.googleapis.com/drive/v3` |
//! | `DRIVE_UPLOAD_BASE_URL` | Drive v3 media upload API | `https://www.googleapis.com/upload/drive/v3` |
//! | `DRIVE_SCOPES` | Comma-separated OAuth scopes | `https://www.googleapis.com/auth/drive` |
//! | `DRIVE_PAGE_SIZE` | Files shown on the dashboard | `20` |
//! | `HTTP_TIMEOUT_SECS` | Bounded wait on outbound calls | `60` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `5000` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM pair; enables HTTPS when both set | unset |
//! | `COOKIE_KEY` | Session cookie encryption key (>= 64 bytes) | Ephemeral |
//! | `SECURE_COOKIES` | Mark the session cookie `Secure` | `true` with TLS |
//! | `SESSION_IDLE_TTL_SECS` | Idle session expiry | `86400` |
//! | `UPLOAD_DIR` | Temporary upload copies | `$TMPDIR/drive-relay-uploads` |
//! | `MAX_UPLOAD_BYTES` | Upload request body cap | `536870912` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const GOOGLE_CLIENT_ID_ENV: &str = "GOOGLE_CLIENT_ID";
pub const GOOGLE_CLIENT_SECRET_ENV: &str = "GOOGLE_CLIENT_SECRET";
pub const GOOGLE_REDIRECT_URI_ENV: &str = "GOOGLE_REDIRECT_URI";
pub const GOOGLE_AUTH_URL_ENV: &str = "GOOGLE_AUTH_URL";
pub const GOOGLE_TOKEN_URL_ENV: &str = "GOOGLE_TOKEN_URL";
pub const DRIVE_API_BASE_URL_ENV: &str = "DRIVE_API_BASE_URL";
pub const DRIVE_UPLOAD_BASE_URL_ENV: &str = "DRIVE_UPLOAD_BASE_URL";
pub const DRIVE_SCOPES_ENV: &str = "DRIVE_SCOPES";
pub const DRIVE_PAGE_SIZE_ENV: &str = "DRIVE_PAGE_SIZE";
pub const HTTP_TIMEOUT_ENV: &str = "HTTP_TIMEOUT_SECS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
/// Raw key material for the private session cookie jar.
///
/// Must be at least 64 bytes. When unset, a random key is generated at
/// startup and every session is lost on restart.
pub const COOKIE_KEY_ENV: &str = "COOKIE_KEY";
pub const SECURE_COOKIES_ENV: &str = "SECURE_COOKIES";
pub const SESSION_IDLE_TTL_ENV: &str = "SESSION_IDLE_TTL_SECS";
pub const UPLOAD_DIR_ENV: &str = "UPLOAD_DIR";
pub const MAX_UPLOAD_BYTES_ENV: &str = "MAX_UPLOAD_BYTES";
/// `json` switches the tracing formatter to JSON lines.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/oauth2callback";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
pub const DEFAULT_DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
pub const DEFAULT_DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_SESSION_IDLE_TTL_SECS: i64 = 86_400;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 512 * 1024 * 1024;
pub const SESSION_COOKIE_NAME: &str = "relay_session";

/// Drive rejects page sizes above this.
const MAX_PAGE_SIZE: u32 = 1000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Identity provider settings for the consent flow.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub auth_url: Url,
    pub token_url: Url,
    pub scopes: Vec<String>,
}

/// Remote storage API settings.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    pub api_base_url: String,
    pub upload_base_url: String,
    pub page_size: u32,
    pub http_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub idle_ttl: chrono::Duration,
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsPaths>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::Invalid {
                var: HOST_ENV,
                reason: format!("{e}"),
            })
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub google: GoogleConfig,
    pub drive: DriveConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let client_id = get(GOOGLE_CLIENT_ID_ENV).ok_or(ConfigError::Missing(GOOGLE_CLIENT_ID_ENV))?;
        let client_secret =
            get(GOOGLE_CLIENT_SECRET_ENV).ok_or(ConfigError::Missing(GOOGLE_CLIENT_SECRET_ENV))?;

        let redirect_uri = parse_url(
            GOOGLE_REDIRECT_URI_ENV,
            get(GOOGLE_REDIRECT_URI_ENV).as_deref(),
            DEFAULT_REDIRECT_URI,
        )?;
        let auth_url = parse_url(GOOGLE_AUTH_URL_ENV, get(GOOGLE_AUTH_URL_ENV).as_deref(), DEFAULT_AUTH_URL)?;
        let token_url =
            parse_url(GOOGLE_TOKEN_URL_ENV, get(GOOGLE_TOKEN_URL_ENV).as_deref(), DEFAULT_TOKEN_URL)?;

        let scopes: Vec<String> = get(DRIVE_SCOPES_ENV)
            .map(|s| {
                s.split(',')
                    .map(|scope| scope.trim().to_string())
                    .filter(|scope| !scope.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec![DEFAULT_DRIVE_SCOPE.to_string()]);
        if scopes.is_empty() {
            return Err(ConfigError::Invalid {
                var: DRIVE_SCOPES_ENV,
                reason: "at least one scope is required".into(),
            });
        }

        let page_size: u32 = parse_or(DRIVE_PAGE_SIZE_ENV, get(DRIVE_PAGE_SIZE_ENV), DEFAULT_PAGE_SIZE)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid {
                var: DRIVE_PAGE_SIZE_ENV,
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }

        let timeout_secs: u64 = parse_or(
            HTTP_TIMEOUT_ENV,
            get(HTTP_TIMEOUT_ENV),
            DEFAULT_HTTP_TIMEOUT.as_secs(),
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: HTTP_TIMEOUT_ENV,
                reason: "must be greater than zero".into(),
            });
        }

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let secure_cookies = match get(SECURE_COOKIES_ENV) {
            Some(v) => parse_bool(SECURE_COOKIES_ENV, &v)?,
            None => tls.is_some(),
        };

        let idle_secs: i64 = parse_or(
            SESSION_IDLE_TTL_ENV,
            get(SESSION_IDLE_TTL_ENV),
            DEFAULT_SESSION_IDLE_TTL_SECS,
        )?;
        if idle_secs <= 0 {
            return Err(ConfigError::Invalid {
                var: SESSION_IDLE_TTL_ENV,
                reason: "must be greater than zero".into(),
            });
        }

        let upload_dir = get(UPLOAD_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("drive-relay-uploads"));

        Ok(Self {
            google: GoogleConfig {
                client_id,
                client_secret,
                redirect_uri,
                auth_url,
                token_url,
                scopes,
            },
            drive: DriveConfig {
                api_base_url: trim_base(get(DRIVE_API_BASE_URL_ENV), DEFAULT_DRIVE_API_BASE_URL),
                upload_base_url: trim_base(
                    get(DRIVE_UPLOAD_BASE_URL_ENV),
                    DEFAULT_DRIVE_UPLOAD_BASE_URL,
                ),
                page_size,
                http_timeout: Duration::from_secs(timeout_secs),
            },
            session: SessionConfig {
                cookie_name: SESSION_COOKIE_NAME.to_string(),
                idle_ttl: chrono::Duration::seconds(idle_secs),
                secure_cookies,
            },
            server: ServerConfig {
                host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: parse_or(PORT_ENV, get(PORT_ENV), DEFAULT_PORT)?,
                tls,
                upload_dir,
                max_upload_bytes: parse_or(
                    MAX_UPLOAD_BYTES_ENV,
                    get(MAX_UPLOAD_BYTES_ENV),
                    DEFAULT_MAX_UPLOAD_BYTES,
                )?,
            },
        })
    }
}

fn parse_url(var: &'static str, value: Option<&str>, default: &str) -> Result<Url, ConfigError> {
    value.unwrap_or(default).parse().map_err(|e| ConfigError::Invalid {
        var,
        reason: format!("{e}"),
    })
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::Invalid {
            var,
            reason: format!("expected a boolean, got '{other}'"),
        }),
    }
}

fn trim_base(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}
