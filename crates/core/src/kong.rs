//! Kong integration: region mapping and the connection request.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::form::FormSnapshot;

/// Konnect regions the integration can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KongRegion {
    Au,
    Eu,
    In,
    Me,
    Sg,
    Us,
}

impl KongRegion {
    pub const ALL: [KongRegion; 6] = [
        Self::Au,
        Self::Eu,
        Self::In,
        Self::Me,
        Self::Sg,
        Self::Us,
    ];

    /// Parse a region code (`AU`, `eu`, ...).
    pub fn from_code(code: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|r| r.code().eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid Kong region '{code}'. Must be one of: AU, EU, IN, ME, SG, US"
                ))
            })
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Au => "AU",
            Self::Eu => "EU",
            Self::In => "IN",
            Self::Me => "ME",
            Self::Sg => "SG",
            Self::Us => "US",
        }
    }

    /// Admin API base URL for the region.
    pub fn base_url(self) -> &'static str {
        match self {
            Self::Au => "https://au.api.konghq.com",
            Self::Eu => "https://eu.api.konghq.com",
            Self::In => "https://in.api.konghq.com",
            Self::Me => "https://me.api.konghq.com",
            Self::Sg => "https://sg.api.konghq.com",
            Self::Us => "https://us.api.konghq.com",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Au => "Australia",
            Self::Eu => "Europe",
            Self::In => "India",
            Self::Me => "Middle East",
            Self::Sg => "Singapore",
            Self::Us => "United States",
        }
    }
}

// ---------------------------------------------------------------------------
// Wizard field keys
// ---------------------------------------------------------------------------

pub const FIELD_REGION: &str = "region";
pub const FIELD_ENDPOINT: &str = "endpoint";
pub const FIELD_AUTH_TOKEN: &str = "authToken";

/// Endpoint pre-filled in the credentials step.
pub const DEFAULT_ENDPOINT: &str = "/v2/control-planes";

/// Body sent to establish a Kong client connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct KongConnectRequest {
    #[validate(url)]
    pub base_url: String,
    #[validate(length(min = 1, message = "Endpoint is required"))]
    pub endpoint: String,
    #[validate(length(min = 1, message = "Auth token is required"))]
    pub auth_token: String,
}

impl KongConnectRequest {
    pub fn new(region: KongRegion, endpoint: &str, auth_token: &str) -> Result<Self, CoreError> {
        let request = Self {
            base_url: region.base_url().to_string(),
            endpoint: endpoint.trim().to_string(),
            auth_token: auth_token.trim().to_string(),
        };
        request
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        Ok(request)
    }

    /// Build the request from the snapshots of the Kong connection wizard.
    pub fn from_snapshots(steps: &[FormSnapshot]) -> Result<Self, CoreError> {
        let find = |key: &str| {
            steps
                .iter()
                .find_map(|s| s.value(key))
                .map(|v| v.as_text().to_string())
                .unwrap_or_default()
        };
        let region = KongRegion::from_code(&find(FIELD_REGION))?;
        Self::new(region, &find(FIELD_ENDPOINT), &find(FIELD_AUTH_TOKEN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn every_region_maps_to_https_url() {
        for region in KongRegion::ALL {
            assert!(region.base_url().starts_with("https://"));
            assert_eq!(KongRegion::from_code(region.code()).unwrap(), region);
        }
    }

    #[test]
    fn region_codes_parse_case_insensitively() {
        assert_eq!(KongRegion::from_code("eu").unwrap(), KongRegion::Eu);
        assert_eq!(KongRegion::from_code(" SG ").unwrap(), KongRegion::Sg);
        assert_matches!(KongRegion::from_code("XX"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn connect_request_requires_token() {
        assert_matches!(
            KongConnectRequest::new(KongRegion::Us, DEFAULT_ENDPOINT, "  "),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn connect_request_serializes_snake_case() {
        let request = KongConnectRequest::new(KongRegion::In, DEFAULT_ENDPOINT, "kpat_123").unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["base_url"], "https://in.api.konghq.com");
        assert_eq!(json["endpoint"], DEFAULT_ENDPOINT);
        assert_eq!(json["auth_token"], "kpat_123");
    }
}
