//! GLPI REST client holding one user's session.
//!
//! `GlpiClient` wraps a `reqwest::Client` together with the instance URL, the
//! application token and the session of one set of credentials. One client is
//! built per run; it is never shared between runs.

use std::fmt;
use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use super::error::GlpiApiError;

/// Header carrying the application token.
const HEADER_APP_TOKEN: &str = "App-Token";
/// Header carrying the session token.
const HEADER_SESSION_TOKEN: &str = "Session-Token";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Login credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

/// Connection settings shared by every client of one GLPI instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlpiEndpoint {
    /// REST base URL, e.g. `https://glpi.example.org/apirest.php`.
    pub base_url: String,
    /// Application token sent with every request.
    pub app_token: String,
    /// Authentication source passed to `initSession` (e.g. an LDAP directory id).
    pub auth_source: String,
}

/// A GLPI API client bound to one set of credentials.
pub struct GlpiClient {
    http: reqwest::Client,
    endpoint: GlpiEndpoint,
    credentials: Credentials,
    session_token: RwLock<Option<String>>,
}

impl GlpiClient {
    /// Creates a client. No request is made until the first effect runs.
    pub fn new(endpoint: GlpiEndpoint, credentials: Credentials) -> Result<Self, GlpiApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(GlpiApiError::from_reqwest)?;
        Ok(GlpiClient {
            http,
            endpoint,
            credentials,
            session_token: RwLock::new(None),
        })
    }

    /// Returns the credentials this client logs in with.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the authentication source for `initSession`.
    pub fn auth_source(&self) -> &str {
        &self.endpoint.auth_source
    }

    /// Returns the current session token, if a session was opened.
    pub async fn session_token(&self) -> Option<String> {
        self.session_token.read().await.clone()
    }

    /// Stores the session token for subsequent requests.
    pub async fn set_session_token(&self, token: String) {
        *self.session_token.write().await = Some(token);
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint.base_url.trim_end_matches('/'), path)
    }

    /// Sends one request and returns the decoded JSON body.
    ///
    /// An empty body decodes to `Value::Null`. A non-success status is an
    /// error even when the body is not error-shaped; error-shaped bodies are
    /// left to the caller, since list endpoints legitimately return arrays.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, GlpiApiError> {
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .header(HEADER_APP_TOKEN, &self.endpoint.app_token);

        if let Some(token) = self.session_token().await {
            request = request.header(HEADER_SESSION_TOKEN, token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "GLPI request");
        let response = request.send().await.map_err(GlpiApiError::from_reqwest)?;
        let status = response.status();
        let text = response.text().await.map_err(GlpiApiError::from_reqwest)?;
        trace!(status = status.as_u16(), bytes = text.len(), "GLPI response");

        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).map_err(|e| {
                GlpiApiError::decode(format!("{} {}: invalid JSON body: {}", method, path, e))
            })?
        };

        if !status.is_success() {
            return Err(GlpiApiError::from_error_array(&value, Some(status.as_u16()))
                .unwrap_or_else(|| {
                    GlpiApiError::remote(
                        format!("{} {} failed: {}", method, path, value),
                        Some(status.as_u16()),
                    )
                }));
        }

        Ok(value)
    }

    /// Sends a request whose successful answer is a JSON object (or empty).
    ///
    /// Any array-shaped body is GLPI's error convention.
    pub async fn send_expect_object(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, GlpiApiError> {
        let value = self.send(method, path, query, body).await?;
        match GlpiApiError::from_error_array(&value, None) {
            Some(err) => Err(err),
            None => Ok(value),
        }
    }

    /// Sends a request whose successful answer is a JSON array of records.
    ///
    /// An array of strings is GLPI's error convention.
    pub async fn send_expect_list(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<Value>, GlpiApiError> {
        let value = self.send(method, path, query, None).await?;
        match value {
            Value::Array(items) if items.first().is_some_and(Value::is_string) => {
                Err(GlpiApiError::from_error_array(&Value::Array(items), None)
                    .unwrap_or_else(|| GlpiApiError::decode("unreadable error array")))
            }
            Value::Array(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(GlpiApiError::decode(format!(
                "{}: expected a list, got {}",
                path, other
            ))),
        }
    }
}

impl fmt::Debug for GlpiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlpiClient")
            .field("base_url", &self.endpoint.base_url)
            .field("user", &self.credentials.user)
            .finish_non_exhaustive()
    }
}
