//! QuickBooks integration calls.
//!
//! Every response is opaque JSON handed to the caller as-is.

use std::sync::Arc;

use billflow_core::store::{handoff_put, handoff_take, Store};
use serde_json::Value;

use crate::auth::AuthHeaderProvider;
use crate::client::ApiClient;
use crate::error::Result;

pub const CONNECT_PATH: &str = "/quickbooks/connect";
pub const STATUS_PATH: &str = "/quickbooks/status";
pub const DISCONNECT_PATH: &str = "/quickbooks/disconnect";
pub const CUSTOMER_OVERVIEW_PATH: &str = "/quickbooks/customers/overview";
pub const BULK_SYNC_PATH: &str = "/quickbooks/customers/bulk-sync";

/// Key under which the customer overview is handed to the next view.
pub const OVERVIEW_HANDOFF_KEY: &str = "quickbooks.customerOverview";

#[derive(Debug, Clone)]
pub struct QuickBooksClient {
    api: ApiClient,
}

impl QuickBooksClient {
    /// Every request carries the header produced by `auth`.
    pub fn new(api: ApiClient, auth: Arc<dyn AuthHeaderProvider>) -> Self {
        Self {
            api: api.with_auth(auth),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Start the OAuth connection; typically returns the authorization URL.
    pub async fn connect(&self) -> Result<Value> {
        let response = self.api.get(CONNECT_PATH).await?;
        ApiClient::handle_response(response).await
    }

    pub async fn status(&self) -> Result<Value> {
        let response = self.api.get(STATUS_PATH).await?;
        ApiClient::handle_response(response).await
    }

    pub async fn disconnect(&self) -> Result<Value> {
        let response = self.api.post_empty(DISCONNECT_PATH).await?;
        let body = ApiClient::handle_response(response).await?;
        tracing::info!("QuickBooks disconnected");
        Ok(body)
    }

    pub async fn customer_overview(&self) -> Result<Value> {
        let response = self.api.get(CUSTOMER_OVERVIEW_PATH).await?;
        ApiClient::handle_response(response).await
    }

    /// Push every customer to QuickBooks.
    pub async fn bulk_sync(&self) -> Result<Value> {
        let response = self.api.post_empty(BULK_SYNC_PATH).await?;
        let body = ApiClient::handle_response(response).await?;
        tracing::info!("QuickBooks bulk sync requested");
        Ok(body)
    }

    /// Fetch the customer overview and hand it to the next view.
    pub async fn hand_off_customer_overview(&self, store: &dyn Store) -> Result<()> {
        let overview = self.customer_overview().await?;
        handoff_put(store, OVERVIEW_HANDOFF_KEY, &overview)?;
        Ok(())
    }
}

/// Consume an overview handed off by
/// [`QuickBooksClient::hand_off_customer_overview`].
pub fn take_customer_overview(store: &dyn Store) -> Result<Option<Value>> {
    Ok(handoff_take(store, OVERVIEW_HANDOFF_KEY)?)
}
