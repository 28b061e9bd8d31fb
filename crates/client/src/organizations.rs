//! Contact-sales submission.

use billflow_core::contact_sales::{OrganizationRequest, FIELD_PHONE_NUMBER};

use crate::client::ApiClient;
use crate::error::{ClientError, Result};

pub const ORGANIZATIONS_PATH: &str = "/v1/api/organizations";

/// Create an organization lead. The backend's JSON response is passed through.
///
/// A rejection that names the phone number (either as the `field` of a
/// structured error or in its message) comes back as
/// [`ClientError::BackendValidation`] on `phoneNumber`.
pub async fn submit_organization(
    client: &ApiClient,
    request: &OrganizationRequest,
) -> Result<serde_json::Value> {
    let response = client.post(ORGANIZATIONS_PATH, request).await?;
    match ApiClient::handle_response(response).await {
        Ok(body) => {
            tracing::info!(company = %request.company, country = %request.country, "Organization submitted");
            Ok(body)
        }
        Err(e) => {
            let e = recognise_phone_error(e);
            tracing::warn!(error = %e, "Organization submission rejected");
            Err(e)
        }
    }
}

fn recognise_phone_error(error: ClientError) -> ClientError {
    match error {
        ClientError::Api { status, message } if mentions_phone_number(&message) => {
            ClientError::BackendValidation {
                status,
                field: Some(FIELD_PHONE_NUMBER.to_string()),
                message,
            }
        }
        ClientError::BackendValidation {
            status,
            field: None,
            message,
        } if mentions_phone_number(&message) => ClientError::BackendValidation {
            status,
            field: Some(FIELD_PHONE_NUMBER.to_string()),
            message,
        },
        other => other,
    }
}

fn mentions_phone_number(message: &str) -> bool {
    message.to_ascii_lowercase().contains("phone number")
}
