//! Error types for the billflow client.

use billflow_core::error::CoreError;

/// Message shown when a submission fails for any reason other than a
/// recognised field error.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur when calling a billflow backend.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, TLS, body decoding).
    #[error("HTTP request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend rejected a specific field.
    #[error("Backend rejected {}: {message}", field.as_deref().unwrap_or("request"))]
    BackendValidation {
        status: u16,
        field: Option<String>,
        message: String,
    },

    /// Non-2xx response without a recognisable field error.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to deserialize response: {0}")]
    Deserialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A submission is already in flight.
    #[error("A request is already in progress")]
    AlreadySubmitting,

    /// The request could not be built from local state.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// How a failed submission is reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitFailure {
    /// Single generic alert; form state is untouched.
    NetworkFailure,
    /// Mapped onto a field when recognised, else a generic alert.
    BackendValidationFailure,
}

impl ClientError {
    pub fn failure(&self) -> SubmitFailure {
        match self {
            Self::BackendValidation { .. } => SubmitFailure::BackendValidationFailure,
            _ => SubmitFailure::NetworkFailure,
        }
    }

    /// HTTP status of a backend response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BackendValidation { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
