//! The `ApiClient` and its request pipeline.
//!
//! Every endpoint method ends up in [`ApiClient::execute`], which attaches
//! the bearer token for authenticated calls, sends the request and turns a
//! non-success status into [`ApiError::Api`]. Success bodies come back raw;
//! the typed helpers normalize the envelope exactly once while decoding.

use std::sync::Arc;

use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::envelope;
use crate::error::{ApiError, Result};
use crate::session::Session;

/// Whether a request carries the session's bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Never attaches a token.
    Public,
    /// Attaches `Authorization: Bearer <token>` when a token is stored.
    Authenticated,
}

/// Typed client for the Autopeças REST backend.
///
/// Cheap to clone: clones share the HTTP connection pool and the session.
#[derive(Clone, Debug)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

#[derive(Debug)]
struct ApiClientInner {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    /// Create a client for `config` that authenticates through `session`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.base_url(),
                session,
            }),
        })
    }

    /// Create a client with the session `config` describes.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config, config.session())
    }

    /// Create a client from `AUTOPECAS_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client
    /// fails to build.
    pub fn from_env() -> Result<Self> {
        Self::from_config(&ClientConfig::from_env()?)
    }

    /// Base URL every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// The session holding the bearer token.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Store `token` for subsequent authenticated requests.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be written.
    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        Ok(self.inner.session.set_token(token)?)
    }

    /// Forget the stored token.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be cleared.
    pub fn remove_token(&self) -> Result<()> {
        Ok(self.inner.session.remove_token()?)
    }

    /// Whether a token is currently stored.
    ///
    /// # Errors
    ///
    /// Returns error if the token store cannot be read.
    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.inner.session.is_authenticated()?)
    }

    // =========================================================================
    // Untyped requests
    // =========================================================================

    /// Send an authenticated request and return the unwrapped payload.
    ///
    /// The stored token is re-read before sending. A `{"success": true,
    /// "data": ...}` body yields its `data`; any other body is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Api` for non-success statuses, `ApiError::Http` for
    /// transport failures and `ApiError::Parse` for non-JSON success bodies.
    pub async fn authenticated_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let request = with_body(self.request(method, endpoint), body);
        let raw = self.execute(Access::Authenticated, request).await?;
        Ok(envelope::normalize(raw))
    }

    /// Send a request without a token and return the body unchanged.
    ///
    /// # Errors
    ///
    /// Same as [`ApiClient::authenticated_request`].
    pub async fn public_request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let request = with_body(self.request(method, endpoint), body);
        self.execute(Access::Public, request).await
    }

    // =========================================================================
    // Typed helpers used by the endpoint modules
    // =========================================================================

    pub(crate) async fn get<T: DeserializeOwned>(&self, access: Access, endpoint: &str) -> Result<T> {
        let raw = self.execute(access, self.request(Method::GET, endpoint)).await?;
        envelope::decode(raw)
    }

    pub(crate) async fn get_query<T, Q>(&self, access: Access, endpoint: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let request = self.request(Method::GET, endpoint).query(query);
        envelope::decode(self.execute(access, request).await?)
    }

    pub(crate) async fn post<T, B>(&self, access: Access, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(access, Method::POST, endpoint, body).await
    }

    pub(crate) async fn put<T, B>(&self, access: Access, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(access, Method::PUT, endpoint, body).await
    }

    pub(crate) async fn patch<T, B>(&self, access: Access, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_json(access, Method::PATCH, endpoint, body).await
    }

    /// DELETE whose response payload carries nothing worth decoding.
    pub(crate) async fn delete(&self, access: Access, endpoint: &str) -> Result<()> {
        self.execute(access, self.request(Method::DELETE, endpoint))
            .await
            .map(drop)
    }

    /// Request with a JSON body whose response payload is discarded.
    pub(crate) async fn send_unit<B>(
        &self,
        access: Access,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method, endpoint).json(body);
        self.execute(access, request).await.map(drop)
    }

    async fn send_json<T, B>(&self, access: Access, method: Method, endpoint: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.request(method, endpoint).json(body);
        envelope::decode(self.execute(access, request).await?)
    }

    // =========================================================================
    // Pipeline
    // =========================================================================

    pub(crate) fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{endpoint}", self.inner.base_url);
        self.inner
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
    }

    /// Send `request` and return its status with the decoded body.
    ///
    /// An empty body decodes to `Value::Null`. Non-success statuses are
    /// returned, not raised; see [`ApiClient::execute`] for that.
    #[instrument(skip(self, request))]
    pub(crate) async fn send(
        &self,
        access: Access,
        request: RequestBuilder,
    ) -> Result<(StatusCode, std::result::Result<Value, serde_json::Error>)> {
        let request = match access {
            Access::Public => request,
            Access::Authenticated => match self.inner.session.current_token()? {
                Some(token) => request.bearer_auth(token.expose_secret()),
                None => request,
            },
        };

        let request = request.build()?;
        debug!(method = %request.method(), path = request.url().path(), "Sending request");

        let response = self.inner.http.execute(request).await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let body = if bytes.trim_ascii().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };

        Ok((status, body))
    }

    /// Send `request`, failing on non-success statuses.
    pub(crate) async fn execute(&self, access: Access, request: RequestBuilder) -> Result<Value> {
        let (status, body) = self.send(access, request).await?;

        if status.is_success() {
            return Ok(body?);
        }

        let error = error_from_body(status, body.ok().as_ref());
        warn!(status = status.as_u16(), error = %error, "Request failed");
        Err(error)
    }
}

fn with_body(request: RequestBuilder, body: Option<&Value>) -> RequestBuilder {
    match body {
        Some(body) => request.json(body),
        None => request,
    }
}

/// Build the `ApiError::Api` for a failed response.
fn error_from_body(status: StatusCode, body: Option<&Value>) -> ApiError {
    let status = status.as_u16();
    let message = match body {
        Some(body) if !body.is_null() => envelope::error_message(body)
            .unwrap_or_else(|| envelope::generic_error_message(status)),
        _ => envelope::network_error_message(status),
    };
    ApiError::Api { status, message }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_error_from_validation_body() {
        let body = json!({"errors": [{"msg": "Email invalid"}]});
        let err = error_from_body(StatusCode::UNPROCESSABLE_ENTITY, Some(&body));
        assert_eq!(err.to_string(), "Email invalid");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_error_without_body_is_network_error() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, None);
        assert_eq!(
            err.to_string(),
            "Network error: the server responded with HTTP 502"
        );

        let err = error_from_body(StatusCode::BAD_GATEWAY, Some(&Value::Null));
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().starts_with("Network error"));
    }

    #[test]
    fn test_error_with_unhelpful_body_is_generic() {
        let err = error_from_body(StatusCode::INTERNAL_SERVER_ERROR, Some(&json!({"ok": false})));
        assert_eq!(err.to_string(), "Request failed with HTTP 500");
    }

    #[test]
    fn test_base_url_joins_endpoint() {
        let config = ClientConfig::for_url("http://127.0.0.1:9/api/").unwrap();
        let client = ApiClient::new(&config, Session::in_memory()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:9/api");

        let request = client.request(Method::GET, "/products").build().unwrap();
        assert_eq!(request.url().as_str(), "http://127.0.0.1:9/api/products");
    }

    #[test]
    fn test_token_round_trip_through_client() {
        let client = ApiClient::new(&ClientConfig::local().unwrap(), Session::in_memory()).unwrap();
        assert!(!client.is_authenticated().unwrap());
        client.set_token("abc").unwrap();
        assert!(client.is_authenticated().unwrap());
        client.remove_token().unwrap();
        assert!(!client.is_authenticated().unwrap());
    }
}
