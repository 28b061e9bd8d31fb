use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthHeaderProvider;
use crate::client::ApiClient;
use crate::error::{ClientError, Result};
use crate::kong::KongClient;
use crate::quickbooks::QuickBooksClient;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Client configuration loaded from environment variables.
///
/// The QuickBooks and Kong hosts fall back to the billflow API URL, which
/// suits a local gateway proxying both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the organizations / countries backend.
    pub api_url: String,
    pub quickbooks_url: String,
    pub kong_url: String,
    /// Per-request timeout. `None` means requests never time out.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            quickbooks_url: DEFAULT_API_URL.to_string(),
            kong_url: DEFAULT_API_URL.to_string(),
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                   |
    /// |---------------------------------|---------------------------|
    /// | `BILLFLOW_API_URL`              | `http://localhost:8080`   |
    /// | `QUICKBOOKS_API_URL`            | value of `BILLFLOW_API_URL` |
    /// | `KONG_CONNECT_URL`              | value of `BILLFLOW_API_URL` |
    /// | `BILLFLOW_REQUEST_TIMEOUT_SECS` | unset (no timeout)        |
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read a `.env` file if present, then [`Self::from_env`].
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Client for the organizations / countries backend.
    pub fn api_client(&self) -> Result<ApiClient> {
        self.client_for(&self.api_url)
    }

    pub fn quickbooks_client(&self, auth: Arc<dyn AuthHeaderProvider>) -> Result<QuickBooksClient> {
        Ok(QuickBooksClient::new(self.client_for(&self.quickbooks_url)?, auth))
    }

    pub fn kong_client(&self) -> Result<KongClient> {
        Ok(KongClient::new(self.client_for(&self.kong_url)?))
    }

    fn client_for(&self, base_url: &str) -> Result<ApiClient> {
        Ok(ApiClient::new(base_url)?.with_timeout(self.request_timeout))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = non_empty("BILLFLOW_API_URL").unwrap_or_else(|| DEFAULT_API_URL.into());
        let quickbooks_url = non_empty("QUICKBOOKS_API_URL").unwrap_or_else(|| api_url.clone());
        let kong_url = non_empty("KONG_CONNECT_URL").unwrap_or_else(|| api_url.clone());

        let request_timeout = match non_empty("BILLFLOW_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ClientError::Config(format!(
                        "BILLFLOW_REQUEST_TIMEOUT_SECS must be a valid u64, got '{raw}'"
                    ))
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        for (key, url) in [
            ("BILLFLOW_API_URL", &api_url),
            ("QUICKBOOKS_API_URL", &quickbooks_url),
            ("KONG_CONNECT_URL", &kong_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ClientError::Config(format!(
                    "{key} must start with http:// or https://, got: {url}"
                )));
            }
        }

        Ok(Self {
            api_url,
            quickbooks_url,
            kong_url,
            request_timeout,
        })
    }
}
