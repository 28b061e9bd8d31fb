//! Country metadata with a built-in fallback.

use billflow_core::countries::{Country, CountryCatalog};

use crate::client::ApiClient;
use crate::error::Result;

pub const COUNTRIES_PATH: &str = "/v1/api/meta/countries";

/// Fetch the country list from the backend.
pub async fn fetch_countries(client: &ApiClient) -> Result<Vec<Country>> {
    let response = client.get(COUNTRIES_PATH).await?;
    ApiClient::handle_response(response).await
}

/// Fetch countries, falling back to the built-in list on any failure or an
/// empty response. Always sorted by name.
pub async fn load_countries(client: &ApiClient) -> CountryCatalog {
    match fetch_countries(client).await {
        Ok(countries) if !countries.is_empty() => {
            tracing::debug!(count = countries.len(), "Loaded countries from backend");
            CountryCatalog::from_countries(countries)
        }
        Ok(_) => {
            tracing::warn!("Backend returned no countries, using fallback list");
            CountryCatalog::fallback()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch countries, using fallback list");
            CountryCatalog::fallback()
        }
    }
}
