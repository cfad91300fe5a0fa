// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Google OAuth 2.0 consent flow.
//!
//! Builds the consent URL and performs the authorization-code and
//! refresh-token grants. Each grant is one request against the token
//! endpoint; nothing is retried.

use chrono::Utc;
use serde::Deserialize;
use url::Url;

use super::credential::{DelegatedCredential, TokenResponse};
use super::error::AuthError;
use crate::config::GoogleConfig;

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Grant {
    AuthorizationCode,
    RefreshToken,
}

impl Grant {
    fn failure(self, detail: String) -> AuthError {
        match self {
            Grant::AuthorizationCode => AuthError::Exchange(detail),
            Grant::RefreshToken => AuthError::Refresh(detail),
        }
    }
}

pub struct OAuthClient {
    config: GoogleConfig,
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new(config: GoogleConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Scopes requested on the consent screen by default.
    pub fn default_scopes(&self) -> &[String] {
        &self.config.scopes
    }

    /// Authorization endpoint URL requesting offline access for `scopes`.
    ///
    /// Deterministic: the same scopes always yield the same URL.
    pub fn consent_url(&self, scopes: &[String]) -> Url {
        let mut url = self.config.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", self.config.redirect_uri.as_str())
            .append_pair("scope", &scopes.join(" "))
            .append_pair("access_type", "offline");
        url
    }

    /// Exchange a one-time authorization code for a credential.
    ///
    /// # Errors
    ///
    /// [`AuthError::Exchange`] on network failure, a non-success response, an
    /// unreadable body or an empty access token. No credential is produced in that case.
    pub async fn exchange_code(&self, code: &str) -> Result<DelegatedCredential, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let issued_at = Utc::now();
        let token = self.token_request(&params, Grant::AuthorizationCode).await?;
        Ok(token.into_credential(issued_at, None))
    }

    /// Obtain a fresh access token using the credential's refresh token.
    ///
    /// # Errors
    ///
    /// [`AuthError::Refresh`] when the credential has no refresh token or the
    /// provider refuses the grant.
    pub async fn refresh(
        &self,
        credential: &DelegatedCredential,
    ) -> Result<DelegatedCredential, AuthError> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AuthError::Refresh("no refresh token".into()))?;

        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let issued_at = Utc::now();
        let token = self.token_request(&params, Grant::RefreshToken).await?;
        Ok(token.into_credential(issued_at, Some(credential)))
    }

    async fn token_request(
        &self,
        params: &[(&str, &str)],
        grant: Grant,
    ) -> Result<TokenResponse, AuthError> {
        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(params)
            .send()
            .await
            .map_err(|e| grant.failure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(grant.failure(describe_token_error(status.as_u16(), &body)));
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| grant.failure(format!("invalid token response: {e}")))?;

        if token.access_token.trim().is_empty() {
            return Err(grant.failure("token response has an empty access_token".into()));
        }
        Ok(token)
    }
}

fn describe_token_error(status: u16, body: &str) -> String {
    match serde_json::from_str::<TokenErrorBody>(body) {
        Ok(TokenErrorBody {
            error,
            error_description: Some(description),
        }) => format!("HTTP {status}: {error} ({description})"),
        Ok(TokenErrorBody { error, .. }) => format!("HTTP {status}: {error}"),
        Err(_) if body.is_empty() => format!("HTTP {status}"),
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(token_url: &str) -> GoogleConfig {
        GoogleConfig {
            client_id: "client-123".into(),
            client_secret: "secret-456".into(),
            redirect_uri: "http://localhost:5000/oauth2callback".parse().unwrap(),
            auth_url: "https://accounts.google.com/o/oauth2/v2/auth".parse().unwrap(),
            token_url: token_url.parse().unwrap(),
            scopes: vec!["https://www.googleapis.com/auth/drive".into()],
        }
    }

    fn client(token_url: &str) -> OAuthClient {
        OAuthClient::new(config(token_url), reqwest::Client::new())
    }

    #[test]
    fn consent_url_requests_offline_access_for_scopes() {
        let client = client("https://oauth2.googleapis.com/token");
        let url = client.consent_url(client.default_scopes());

        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(url.host_str(), Some("accounts.google.com"));
        assert_eq!(get("access_type"), Some("offline"));
        assert_eq!(get("response_type"), Some("code"));
        assert_eq!(get("client_id"), Some("client-123"));
        assert_eq!(get("redirect_uri"), Some("http://localhost:5000/oauth2callback"));
        assert_eq!(get("scope"), Some("https://www.googleapis.com/auth/drive"));
    }

    #[test]
    fn consent_url_is_deterministic_and_joins_scopes() {
        let client = client("https://oauth2.googleapis.com/token");
        let scopes = vec!["openid".to_string(), "email".to_string()];

        let first = client.consent_url(&scopes);
        assert_eq!(first, client.consent_url(&scopes));
        assert!(first.as_str().contains("scope=openid+email"));
    }

    #[tokio::test]
    async fn exchange_code_returns_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=4%2Fabc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok1",
                "expires_in": 3599,
                "refresh_token": "refresh-1",
                "scope": "https://www.googleapis.com/auth/drive",
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let credential = client(&format!("{}/token", server.uri()))
            .exchange_code("4/abc")
            .await
            .unwrap();

        assert_eq!(credential.access_token, "tok1");
        assert_eq!(credential.refresh_token.as_deref(), Some("refresh-1"));
        assert!(credential.expires_at.is_some());
    }

    #[tokio::test]
    async fn exchange_failure_carries_provider_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "invalid_grant",
                "error_description": "Bad Request"
            })))
            .mount(&server)
            .await;

        let err = client(&format!("{}/token", server.uri()))
            .exchange_code("used-code")
            .await
            .unwrap_err();

        match err {
            AuthError::Exchange(detail) => {
                assert_eq!(detail, "HTTP 400: invalid_grant (Bad Request)");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn refresh_keeps_refresh_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=refresh-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok2",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut stale = DelegatedCredential::bearer("tok1");
        stale.refresh_token = Some("refresh-1".into());

        let fresh = client(&format!("{}/token", server.uri()))
            .refresh(&stale)
            .await
            .unwrap();

        assert_eq!(fresh.access_token, "tok2");
        assert_eq!(fresh.refresh_token.as_deref(), Some("refresh-1"));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails_fast() {
        let err = client("http://127.0.0.1:9/token")
            .refresh(&DelegatedCredential::bearer("tok1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Refresh(_)));
    }

    #[tokio::test]
    async fn empty_access_token_fails_both_grants() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;
        let client = client(&format!("{}/token", server.uri()));

        let err = client.exchange_code("4/abc").await.unwrap_err();
        assert!(matches!(err, AuthError::Exchange(_)));

        let mut stale = DelegatedCredential::bearer("tok1");
        stale.refresh_token = Some("refresh-1".into());
        let err = client.refresh(&stale).await.unwrap_err();
        assert!(matches!(err, AuthError::Refresh(_)));
    }

    #[test]
    fn token_error_description_falls_back_to_raw_body() {
        assert_eq!(describe_token_error(502, ""), "HTTP 502");
        assert_eq!(describe_token_error(502, "upstream"), "HTTP 502: upstream");
    }
}
