//! End-to-end contact-sales submission against a mock backend.

use std::sync::Arc;

use assert_matches::assert_matches;
use billflow_client::flow::{ContactSalesFlow, SubmitOutcome};
use billflow_client::{ApiClient, SubmitFailure};
use billflow_core::contact_sales::{self, *};
use billflow_core::countries::CountryCatalog;
use billflow_core::form::FormState;
use billflow_core::types::FieldValue;
use billflow_core::validators::ErrorKind;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn john_doe(email: &str) -> FormState {
    let mut form = contact_sales::new_form(Arc::new(CountryCatalog::fallback()));
    form.set_field(FIELD_FIRST_NAME, FieldValue::text("John"));
    form.set_field(FIELD_LAST_NAME, FieldValue::text("Doe"));
    form.set_field(FIELD_COMPANY, FieldValue::text("Acme"));
    form.set_field(FIELD_BUSINESS_EMAIL, FieldValue::text(email));
    form.set_field(FIELD_ROLE, FieldValue::choice("CEO"));
    form.set_field(FIELD_EMPLOYEE_SIZE, FieldValue::choice("_11_50"));
    form.set_field(FIELD_COUNTRY, FieldValue::choice("IN"));
    form.set_field(FIELD_PHONE_NUMBER, FieldValue::text("+91 9876543210"));
    form.set_gate(GATE_TERMS_ACCEPTED, true);
    form
}

fn flow(server: &MockServer) -> ContactSalesFlow {
    ContactSalesFlow::new(ApiClient::new(server.uri()).unwrap())
}

#[tokio::test]
async fn valid_submission_shows_thank_you() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/api/organizations"))
        .and(body_partial_json(json!({
            "firstName": "John",
            "lastName": "Doe",
            "company": "Acme",
            "businessEmail": "john@acme.com",
            "country": "IN",
            "phoneNumber": "+91 9876543210",
            "customRole": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "org-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut form = john_doe("john@acme.com");
    assert!(form.is_submittable());

    let outcome = flow(&server).submit(&mut form).await;
    assert_eq!(outcome, SubmitOutcome::ThankYou(json!({ "id": "org-1" })));
    assert!(form.form_error().is_none());
}

#[tokio::test]
async fn personal_email_blocks_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = john_doe("john@gmail.com");
    assert!(!form.is_submittable());

    let outcome = flow(&server).submit(&mut form).await;
    assert_eq!(outcome, SubmitOutcome::Invalid);

    let err = form.error(FIELD_BUSINESS_EMAIL).unwrap();
    assert_eq!(err.kind, ErrorKind::PersonalDomainRejected);
    assert_eq!(err.message, "Invalid email id");
}

async fn mount_unreachable_endpoint(server: &MockServer) {
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(server)
        .await;
}

#[tokio::test]
async fn unchecked_terms_block_without_request() {
    let server = MockServer::start().await;
    mount_unreachable_endpoint(&server).await;

    let mut form = john_doe("john@acme.com");
    form.set_gate(GATE_TERMS_ACCEPTED, false);

    let outcome = flow(&server).submit(&mut form).await;
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(form.closed_gates(), vec![GATE_TERMS_ACCEPTED]);
    assert!(form.form_error().is_none());
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn unlisted_employee_size_blocks_without_request() {
    let server = MockServer::start().await;
    mount_unreachable_endpoint(&server).await;

    let mut form = john_doe("john@acme.com");
    form.set_field(FIELD_EMPLOYEE_SIZE, FieldValue::choice("lots"));

    let outcome = flow(&server).submit(&mut form).await;
    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert_eq!(
        form.error(FIELD_EMPLOYEE_SIZE).map(|e| e.kind),
        Some(ErrorKind::InvalidFormat)
    );
    assert!(form.form_error().is_none());
}

#[tokio::test]
async fn server_error_keeps_values_and_sets_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/api/organizations"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let mut form = john_doe("john@acme.com");
    let before = form.values().clone();

    let outcome = flow(&server).submit(&mut form).await;
    assert_eq!(outcome, SubmitOutcome::Failed(SubmitFailure::NetworkFailure));
    assert!(form.form_error().is_some());
    assert_eq!(form.values(), &before);
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let mut form = john_doe("john@acme.com");
    let outcome = ContactSalesFlow::new(ApiClient::new(uri).unwrap())
        .submit(&mut form)
        .await;
    assert_eq!(outcome, SubmitOutcome::Failed(SubmitFailure::NetworkFailure));
    assert_eq!(form.text(FIELD_FIRST_NAME), "John");
}

#[tokio::test]
async fn backend_phone_rejection_lands_on_phone_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/api/organizations"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid phone number" })),
        )
        .mount(&server)
        .await;

    let mut form = john_doe("john@acme.com");
    let outcome = flow(&server).submit(&mut form).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(SubmitFailure::BackendValidationFailure)
    );
    assert_matches!(
        form.error(FIELD_PHONE_NUMBER),
        Some(e) if e.kind == ErrorKind::InvalidPhoneFormat
    );
    assert!(form.form_error().is_none());
}

#[tokio::test]
async fn unknown_field_rejection_falls_back_to_alert() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/api/organizations"))
        .respond_with(
            ResponseTemplate::new(422)
                .set_body_json(json!({ "field": "tenantId", "message": "Unknown tenant" })),
        )
        .mount(&server)
        .await;

    let mut form = john_doe("john@acme.com");
    let outcome = flow(&server).submit(&mut form).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed(SubmitFailure::BackendValidationFailure)
    );
    assert!(form.form_error().is_some());
}
