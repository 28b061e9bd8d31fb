//! Submit flows: the glue between a form and its backend call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use billflow_core::contact_sales::{OrganizationRequest, FIELD_PHONE_NUMBER};
use billflow_core::form::FormState;
use billflow_core::validators::{ErrorKind, FieldError};
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::{ClientError, Result, SubmitFailure, GENERIC_FAILURE_MESSAGE};
use crate::organizations;

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

/// "Is submitting" flag shared by the triggering control and its handler.
#[derive(Debug, Clone, Default)]
pub struct InFlight(Arc<AtomicBool>);

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the triggering control should be disabled.
    pub fn is_submitting(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark a request as started. The flag clears when the guard drops.
    pub fn begin(&self) -> Result<InFlightGuard> {
        if self
            .0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ClientError::AlreadySubmitting);
        }
        Ok(InFlightGuard(Arc::clone(&self.0)))
    }
}

#[derive(Debug)]
pub struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// Contact sales
// ---------------------------------------------------------------------------

/// What the view should do after a submit attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Show the thank-you view.
    ThankYou(Value),
    /// Field errors are populated or a gate is closed (see
    /// [`FormState::closed_gates`]); no request was made.
    Invalid,
    /// A submission is already in flight; the attempt was ignored.
    Busy,
    /// The request failed. Errors are set on the form and values are kept.
    Failed(SubmitFailure),
}

#[derive(Debug, Clone)]
pub struct ContactSalesFlow {
    client: ApiClient,
    in_flight: InFlight,
}

impl ContactSalesFlow {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            in_flight: InFlight::new(),
        }
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Validate the whole form, then post it.
    pub async fn submit(&self, form: &mut FormState) -> SubmitOutcome {
        let _guard = match self.in_flight.begin() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::debug!("Ignoring duplicate contact-sales submit");
                return SubmitOutcome::Busy;
            }
        };

        form.clear_form_error();
        let valid = form.validate_all();
        if !valid || !form.is_submittable() {
            tracing::debug!(
                errors = form.errors().len(),
                closed_gates = ?form.closed_gates(),
                "Contact-sales form blocked"
            );
            return SubmitOutcome::Invalid;
        }

        let request = match OrganizationRequest::from_form(form) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Contact-sales request could not be built");
                return SubmitOutcome::Invalid;
            }
        };

        match organizations::submit_organization(&self.client, &request).await {
            Ok(body) => SubmitOutcome::ThankYou(body),
            Err(e) => {
                let failure = e.failure();
                apply_failure(form, e);
                SubmitOutcome::Failed(failure)
            }
        }
    }
}

/// Report a failed submission on the form without touching its values.
fn apply_failure(form: &mut FormState, error: ClientError) {
    match error {
        ClientError::BackendValidation {
            field: Some(field),
            message,
            ..
        } if form.definition().spec(&field).is_some() => {
            let field_error = if field == FIELD_PHONE_NUMBER {
                FieldError::new(ErrorKind::InvalidPhoneFormat)
            } else {
                FieldError::with_message(ErrorKind::InvalidFormat, message)
            };
            form.set_error(&field, field_error);
        }
        other => {
            tracing::error!(error = %other, "Contact-sales submission failed");
            form.set_form_error(GENERIC_FAILURE_MESSAGE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn in_flight_blocks_until_guard_drops() {
        let flag = InFlight::new();
        let guard = flag.begin().unwrap();
        assert!(flag.is_submitting());
        assert_matches!(flag.clone().begin(), Err(ClientError::AlreadySubmitting));
        drop(guard);
        assert!(!flag.is_submitting());
        assert!(flag.begin().is_ok());
    }
}
