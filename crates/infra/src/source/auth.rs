//! Source API authentication
//!
//! Logs in with the configured static credentials, parses the issued bearer
//! token plus issuer metadata, and persists the credential through the store.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use statbridge_core::CredentialStore;
use statbridge_domain::{AuthError, Credential, SourceApiConfig, StatBridgeError};
use tracing::{info, warn};

use crate::http::HttpClient;

/// Application-level "all good" marker used by the source API.
pub(crate) const NO_ERROR: &str = "NO_ERROR";

/// Authenticates against the source API and persists the session credential.
pub struct Authenticator {
    http: HttpClient,
    auth_url: String,
    username: String,
    password: String,
    store: Arc<dyn CredentialStore>,
}

impl Authenticator {
    /// Create an authenticator from the source API configuration.
    ///
    /// # Errors
    ///
    /// Returns `StatBridgeError::Config` if the HTTP client cannot be built.
    pub fn new(
        config: &SourceApiConfig,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, StatBridgeError> {
        let http = HttpClient::builder()
            .user_agent(concat!("statbridge/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            auth_url: config.auth_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            store,
        })
    }

    /// Log in and persist the freshly issued credential.
    ///
    /// The stored document is fully overwritten; no stale fields survive a
    /// login. Exactly one store write happens per successful call.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Rejected`] when the endpoint reports an application
    ///   error code
    /// - [`AuthError::Unreachable`] on transport failure, a non-success HTTP
    ///   status, or an unparseable response
    pub async fn login(&self) -> Result<Credential, AuthError> {
        info!(url = %self.auth_url, "logging in against source API");

        let payload =
            LoginRequest { username: self.username.clone(), password: self.password.clone() };
        let request = self.http.request(Method::POST, &self.auth_url).json(&payload);

        let response =
            self.http.send(request).await.map_err(|err| AuthError::Unreachable(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Unreachable(format!(
                "authentication endpoint returned status {status}"
            )));
        }

        let body: LoginResponse = response.json().await.map_err(|err| {
            AuthError::Unreachable(format!("failed to parse login response: {err}"))
        })?;

        if let Some(code) = body.error_code {
            if code != NO_ERROR {
                return Err(AuthError::Rejected(code));
            }
        }

        let data = body
            .data
            .ok_or_else(|| AuthError::Rejected("login response missing data".to_string()))?;

        let credential = Credential {
            token: data.token,
            issued_at: Some(Utc::now().to_rfc3339()),
            user_email: Some(data.email),
            user_name: Some(format!("{} {}", data.first_name, data.last_name)),
        };

        if credential.token.is_empty() {
            return Err(AuthError::Rejected("login response carried an empty token".to_string()));
        }

        // Persistence only saves a login after restart; a failed write must
        // not discard an otherwise valid session.
        if let Err(err) = self.store.store(&credential).await {
            warn!(error = %err, "failed to persist credential after login");
        }

        info!(user = credential.user_email.as_deref().unwrap_or("<unknown>"), "login successful");
        Ok(credential)
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    data: Option<LoginData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    #[serde(default)]
    token: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    first_name: String,
    #[serde(default)]
    last_name: String,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::credentials::FileCredentialStore;

    fn config(server: &MockServer) -> SourceApiConfig {
        SourceApiConfig {
            auth_url: format!("{}/authenticate", server.uri()),
            stats_url: format!("{}/stats", server.uri()),
            username: "ops@example.com".to_string(),
            password: "secret".to_string(),
            token_expiry_hours: 2,
            page_limit: 1000,
        }
    }

    fn login_body(token: &str) -> serde_json::Value {
        serde_json::json!({
            "errorCode": "NO_ERROR",
            "data": {
                "token": token,
                "email": "ops@example.com",
                "firstName": "Ops",
                "lastName": "User"
            }
        })
    }

    #[tokio::test]
    async fn successful_login_persists_the_credential() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .and(body_json(serde_json::json!({
                "username": "ops@example.com",
                "password": "secret"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(login_body("tok-abc")))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
        let authenticator = Authenticator::new(&config(&server), store.clone()).unwrap();

        let credential = authenticator.login().await.unwrap();
        assert_eq!(credential.token, "tok-abc");
        assert_eq!(credential.user_name.as_deref(), Some("Ops User"));
        assert!(credential.issued_at.is_some());

        let persisted = store.load().await.unwrap().unwrap();
        assert_eq!(persisted.token, "tok-abc");
    }

    #[tokio::test]
    async fn application_error_code_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "errorCode": "INVALID_CREDENTIALS"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
        let authenticator = Authenticator::new(&config(&server), store.clone()).unwrap();

        let err = authenticator.login().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(ref code) if code == "INVALID_CREDENTIALS"));

        // A rejected login must not write anything.
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn http_failure_is_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
        let authenticator = Authenticator::new(&config(&server), store).unwrap();

        let err = authenticator.login().await.unwrap_err();
        assert!(matches!(err, AuthError::Unreachable(_)));
    }

    #[tokio::test]
    async fn missing_data_section_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authenticate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"errorCode": "NO_ERROR"})),
            )
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileCredentialStore::new(dir.path().join("credentials.json")));
        let authenticator = Authenticator::new(&config(&server), store).unwrap();

        let err = authenticator.login().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected(_)));
    }
}
