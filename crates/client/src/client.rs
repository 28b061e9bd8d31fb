//! HTTP plumbing shared by every service client.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::AuthHeaderProvider;
use crate::error::{ClientError, Result};

/// A client bound to one base URL.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Option<Duration>,
    auth: Option<Arc<dyn AuthHeaderProvider>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("auth", &self.auth.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create a client for `base_url`. No request timeout is set.
    ///
    /// Returns [`ClientError::InvalidUrl`] unless the URL is http(s).
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ClientError::InvalidUrl(format!(
                "URL must start with http:// or https://, got: {base_url}"
            )));
        }
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            timeout: None,
            auth: None,
        })
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_http(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    /// Per-request timeout, applied on top of whichever
    /// [`reqwest::Client`] is in use. `None` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach an auth-header provider consulted on every request.
    #[must_use]
    pub fn with_auth(mut self, provider: Arc<dyn AuthHeaderProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn prepare(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let builder = match self.timeout {
            Some(timeout) => builder.timeout(timeout),
            None => builder,
        };
        match &self.auth {
            Some(provider) => {
                let value = provider.authorization().await?;
                Ok(builder.header(reqwest::header::AUTHORIZATION, value))
            }
            None => Ok(builder),
        }
    }

    pub(crate) async fn get(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let request = self.prepare(self.http.get(&url)).await?;
        Ok(request.send().await?)
    }

    pub(crate) async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Response> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let request = self.prepare(self.http.post(&url)).await?.json(body);
        Ok(request.send().await?)
    }

    /// POST without a body.
    pub(crate) async fn post_empty(&self, path: &str) -> Result<Response> {
        let url = self.url(path);
        tracing::debug!(%url, "POST");
        let request = self.prepare(self.http.post(&url)).await?;
        Ok(request.send().await?)
    }

    /// Deserialize a 2xx body, or turn anything else into an error.
    ///
    /// An empty 2xx body is read as JSON `null`.
    pub(crate) async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            let raw = if body.trim().is_empty() { "null" } else { body.as_str() };
            return Ok(serde_json::from_str(raw)?);
        }

        Err(error_from_body(status.as_u16(), &body))
    }
}

/// Interpret a non-2xx body.
///
/// A JSON object carrying a `field` key is a field-level rejection; otherwise
/// the `message` or `error` key (or the raw body) becomes the message.
pub(crate) fn error_from_body(status: u16, body: &str) -> ClientError {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return ClientError::Api {
            status,
            message: body.to_string(),
        };
    };

    let message = json["message"]
        .as_str()
        .or_else(|| json["error"].as_str())
        .unwrap_or(body)
        .to_string();

    match json["field"].as_str() {
        Some(field) => ClientError::BackendValidation {
            status,
            field: Some(field.to_string()),
            message,
        },
        None => ClientError::Api { status, message },
    }
}
