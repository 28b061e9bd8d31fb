//! Kong client-connection call.

use async_trait::async_trait;
use billflow_core::form::FormSnapshot;
use billflow_core::kong::KongConnectRequest;
use billflow_core::wizard::WizardSubmitter;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{ClientError, Result};

pub const CONNECT_PATH: &str = "/kong/connect";

#[derive(Debug, Clone)]
pub struct KongClient {
    api: ApiClient,
}

impl KongClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Establish a client connection for the given region and token.
    pub async fn connect(&self, request: &KongConnectRequest) -> Result<Value> {
        let response = self.api.post(CONNECT_PATH, request).await?;
        let body = ApiClient::handle_response(response).await?;
        tracing::info!(base_url = %request.base_url, "Kong connection established");
        Ok(body)
    }
}

/// Submits the Kong connection wizard.
#[async_trait]
impl WizardSubmitter for KongClient {
    type Output = Value;
    type Error = ClientError;

    async fn submit(&self, steps: &[FormSnapshot]) -> Result<Value> {
        let request = KongConnectRequest::from_snapshots(steps)?;
        self.connect(&request).await
    }
}
