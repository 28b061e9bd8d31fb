//! Contact-sales ("Organization") form definition and payload shaping.
//!
//! Defines the field keys, select options and validation rules of the
//! contact-sales form, and converts a submittable form into the JSON body
//! posted to the organizations endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::countries::{CountryCatalog, DEFAULT_COUNTRY_CODE};
use crate::error::CoreError;
use crate::form::{FieldSpec, FormDefinition, FormState};
use crate::types::FieldValue;
use crate::validators::{Rule, OTHER_OPTION};

// ---------------------------------------------------------------------------
// Field keys
// ---------------------------------------------------------------------------

pub const FIELD_FIRST_NAME: &str = "firstName";
pub const FIELD_LAST_NAME: &str = "lastName";
pub const FIELD_COMPANY: &str = "company";
pub const FIELD_BUSINESS_EMAIL: &str = "businessEmail";
pub const FIELD_ROLE: &str = "role";
pub const FIELD_CUSTOM_ROLE: &str = "customRole";
pub const FIELD_EMPLOYEE_SIZE: &str = "employeeSize";
pub const FIELD_COUNTRY: &str = "country";
pub const FIELD_PHONE_NUMBER: &str = "phoneNumber";
pub const FIELD_HOW_CAN_WE_HELP: &str = "howCanWeHelp";
pub const FIELD_MARKETING_OPT_IN: &str = "marketingOptIn";

/// Gate that must be checked before the form can be submitted.
pub const GATE_TERMS_ACCEPTED: &str = "termsAccepted";

/// Form name used in logs.
pub const FORM_NAME: &str = "contact_sales";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Selectable roles. [`OTHER_OPTION`] requires a custom role.
pub const ROLE_OPTIONS: &[&str] = &[
    "CEO",
    "CTO",
    "CFO",
    "VP / Director",
    "Product Manager",
    "Engineering",
    "Finance",
    "Sales",
    OTHER_OPTION,
];

/// Company size buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EmployeeSize {
    #[serde(rename = "_1_10")]
    UpTo10,
    #[serde(rename = "_11_50")]
    From11To50,
    #[serde(rename = "_51_200")]
    From51To200,
    #[serde(rename = "_201_500")]
    From201To500,
    #[serde(rename = "_501_1000")]
    From501To1000,
    #[serde(rename = "_1000_PLUS")]
    Over1000,
}

impl EmployeeSize {
    pub const ALL: [EmployeeSize; 6] = [
        Self::UpTo10,
        Self::From11To50,
        Self::From51To200,
        Self::From201To500,
        Self::From501To1000,
        Self::Over1000,
    ];

    pub const WIRE_VALUES: &'static [&'static str] =
        &["_1_10", "_11_50", "_51_200", "_201_500", "_501_1000", "_1000_PLUS"];

    /// Parse the wire value of a bucket.
    pub fn from_str_wire(s: &str) -> Result<Self, CoreError> {
        Self::ALL
            .into_iter()
            .find(|size| size.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!("Invalid employee size '{s}'"))
            })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::UpTo10 => "_1_10",
            Self::From11To50 => "_11_50",
            Self::From51To200 => "_51_200",
            Self::From201To500 => "_201_500",
            Self::From501To1000 => "_501_1000",
            Self::Over1000 => "_1000_PLUS",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::UpTo10 => "1-10",
            Self::From11To50 => "11-50",
            Self::From51To200 => "51-200",
            Self::From201To500 => "201-500",
            Self::From501To1000 => "501-1000",
            Self::Over1000 => "1000+",
        }
    }
}

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

pub fn definition() -> FormDefinition {
    FormDefinition::new(FORM_NAME)
        .field(FieldSpec::required(FIELD_FIRST_NAME, "First name", Rule::RequiredText))
        .field(FieldSpec::required(FIELD_LAST_NAME, "Last name", Rule::RequiredText))
        .field(FieldSpec::required(FIELD_COMPANY, "Company", Rule::RequiredText))
        .field(FieldSpec::required(
            FIELD_BUSINESS_EMAIL,
            "Business email",
            Rule::BusinessEmail,
        ))
        .field(FieldSpec::required(FIELD_ROLE, "Role", Rule::OneOf(ROLE_OPTIONS)))
        .field(FieldSpec::optional(
            FIELD_CUSTOM_ROLE,
            "Your role",
            Rule::RequiredWhen {
                field: FIELD_ROLE,
                equals: OTHER_OPTION,
            },
        ))
        .field(FieldSpec::required(
            FIELD_EMPLOYEE_SIZE,
            "Employee size",
            Rule::OneOf(EmployeeSize::WIRE_VALUES),
        ))
        .field(
            FieldSpec::required(FIELD_COUNTRY, "Country", Rule::Country)
                .with_initial(FieldValue::choice(DEFAULT_COUNTRY_CODE)),
        )
        .field(FieldSpec::required(
            FIELD_PHONE_NUMBER,
            "Phone number",
            Rule::Phone {
                country_field: FIELD_COUNTRY,
            },
        ))
        .field(FieldSpec::optional(
            FIELD_HOW_CAN_WE_HELP,
            "How can we help?",
            Rule::OptionalText,
        ))
        .field(
            FieldSpec::optional(FIELD_MARKETING_OPT_IN, "Keep me updated", Rule::OptionalText)
                .with_initial(FieldValue::flag(false)),
        )
        .gate(GATE_TERMS_ACCEPTED)
        .dial_code_link(FIELD_COUNTRY, FIELD_PHONE_NUMBER)
}

/// A fresh contact-sales form using the given catalogue.
pub fn new_form(countries: Arc<CountryCatalog>) -> FormState {
    FormState::with_countries(definition(), countries)
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Body of `POST /v1/api/organizations`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRequest {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
    pub business_email: String,
    pub role: String,
    pub custom_role: Option<String>,
    pub employee_size: EmployeeSize,
    pub country: String,
    pub phone_number: String,
    pub how_can_we_help: Option<String>,
    pub marketing_opt_in: bool,
}

impl OrganizationRequest {
    /// Shape the request body from a submittable form.
    pub fn from_form(form: &FormState) -> Result<Self, CoreError> {
        if !form.is_submittable() {
            return Err(CoreError::Validation(
                "Contact-sales form is not ready to submit".to_string(),
            ));
        }

        let text = |key: &str| form.text(key).trim().to_string();
        let optional = |key: &str| {
            let value = text(key);
            (!value.is_empty()).then_some(value)
        };

        let role = text(FIELD_ROLE);
        let custom_role = if role == OTHER_OPTION {
            optional(FIELD_CUSTOM_ROLE)
        } else {
            None
        };

        Ok(Self {
            first_name: text(FIELD_FIRST_NAME),
            last_name: text(FIELD_LAST_NAME),
            company: text(FIELD_COMPANY),
            business_email: text(FIELD_BUSINESS_EMAIL),
            role,
            custom_role,
            employee_size: EmployeeSize::from_str_wire(&text(FIELD_EMPLOYEE_SIZE))?,
            country: text(FIELD_COUNTRY),
            phone_number: text(FIELD_PHONE_NUMBER),
            how_can_we_help: optional(FIELD_HOW_CAN_WE_HELP),
            marketing_opt_in: form
                .value(FIELD_MARKETING_OPT_IN)
                .is_some_and(FieldValue::as_flag),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::ErrorKind;
    use assert_matches::assert_matches;

    fn john_doe() -> FormState {
        let mut form = new_form(Arc::new(CountryCatalog::fallback()));
        form.set_field(FIELD_FIRST_NAME, FieldValue::text("John"));
        form.set_field(FIELD_LAST_NAME, FieldValue::text("Doe"));
        form.set_field(FIELD_BUSINESS_EMAIL, FieldValue::text("john@company.com"));
        form.set_field(FIELD_COMPANY, FieldValue::text("Acme"));
        form.set_field(FIELD_ROLE, FieldValue::choice("CEO"));
        form.set_field(FIELD_EMPLOYEE_SIZE, FieldValue::choice("_11_50"));
        form.set_field(FIELD_COUNTRY, FieldValue::choice("IN"));
        form.set_field(FIELD_PHONE_NUMBER, FieldValue::text("+91 9876543210"));
        form.set_gate(GATE_TERMS_ACCEPTED, true);
        form
    }

    #[test]
    fn fresh_form_defaults_to_india() {
        let form = new_form(Arc::new(CountryCatalog::fallback()));
        assert_eq!(form.text(FIELD_COUNTRY), "IN");
        assert_eq!(form.text(FIELD_PHONE_NUMBER), "+91 ");
        assert!(!form.is_submittable());
    }

    #[test]
    fn complete_form_is_submittable() {
        assert!(john_doe().is_submittable());
    }

    #[test]
    fn wire_values_cover_every_size() {
        let wire: Vec<&str> = EmployeeSize::ALL.iter().map(|s| s.as_str()).collect();
        assert_eq!(wire, EmployeeSize::WIRE_VALUES);
    }

    #[test]
    fn unlisted_choices_block_submission() {
        for (key, bogus) in [
            (FIELD_EMPLOYEE_SIZE, "lots"),
            (FIELD_ROLE, "Wizard"),
            (FIELD_COUNTRY, "ZZ"),
        ] {
            let mut form = john_doe();
            form.set_field(key, FieldValue::choice(bogus));
            assert!(!form.is_submittable(), "{key}={bogus} should block");
            assert!(!form.validate_all());
            assert_eq!(form.error(key).unwrap().kind, ErrorKind::InvalidFormat);
        }
    }

    #[test]
    fn terms_gate_blocks_submission() {
        let mut form = john_doe();
        form.set_gate(GATE_TERMS_ACCEPTED, false);
        assert!(!form.is_submittable());
    }

    #[test]
    fn personal_email_blocks_submission() {
        let mut form = john_doe();
        form.set_field(FIELD_BUSINESS_EMAIL, FieldValue::text("john@gmail.com"));
        assert!(!form.is_submittable());
        assert!(!form.validate_all());
        let err = form.error(FIELD_BUSINESS_EMAIL).unwrap();
        assert_eq!(err.kind, ErrorKind::PersonalDomainRejected);
        assert_eq!(err.message, "Invalid email id");
    }

    #[test]
    fn other_role_requires_custom_role() {
        let mut form = john_doe();
        form.set_field(FIELD_ROLE, FieldValue::choice(OTHER_OPTION));
        assert!(!form.is_submittable());
        form.set_field(FIELD_CUSTOM_ROLE, FieldValue::text("Head of Billing"));
        assert!(form.is_submittable());

        let request = OrganizationRequest::from_form(&form).unwrap();
        assert_eq!(request.role, OTHER_OPTION);
        assert_eq!(request.custom_role.as_deref(), Some("Head of Billing"));
    }

    #[test]
    fn custom_role_dropped_for_regular_roles() {
        let mut form = john_doe();
        form.set_field(FIELD_CUSTOM_ROLE, FieldValue::text("leftover"));
        let request = OrganizationRequest::from_form(&form).unwrap();
        assert!(request.custom_role.is_none());
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let mut form = john_doe();
        form.set_field(FIELD_MARKETING_OPT_IN, FieldValue::flag(true));
        let request = OrganizationRequest::from_form(&form).unwrap();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["firstName"], "John");
        assert_eq!(json["businessEmail"], "john@company.com");
        assert_eq!(json["employeeSize"], "_11_50");
        assert_eq!(json["phoneNumber"], "+91 9876543210");
        assert_eq!(json["marketingOptIn"], true);
        assert!(json["customRole"].is_null());
        assert!(json["howCanWeHelp"].is_null());
    }

    #[test]
    fn payload_refused_for_incomplete_form() {
        let form = new_form(Arc::new(CountryCatalog::fallback()));
        assert_matches!(
            OrganizationRequest::from_form(&form),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn employee_size_wire_values() {
        for size in EmployeeSize::ALL {
            assert_eq!(EmployeeSize::from_str_wire(size.as_str()).unwrap(), size);
            assert!(!size.label().is_empty());
        }
        assert!(EmployeeSize::from_str_wire("huge").is_err());
    }

    #[test]
    fn every_country_seeds_its_dial_code() {
        let countries = Arc::new(CountryCatalog::fallback());
        let mut form = new_form(countries.clone());
        for country in countries.countries() {
            form.set_field(FIELD_COUNTRY, FieldValue::choice(country.code.clone()));
            let seeded = form.text(FIELD_PHONE_NUMBER).to_string();
            assert!(
                seeded.starts_with(&country.dial_code),
                "{} seeded {seeded}",
                country.code
            );

            form.set_field(FIELD_PHONE_NUMBER, FieldValue::text(format!("{seeded}98")));
            assert!(form.text(FIELD_PHONE_NUMBER).starts_with(&country.dial_code));

            // Backspace over the whole prefix leaves it intact.
            form.set_field(FIELD_PHONE_NUMBER, FieldValue::text(""));
            assert_eq!(
                form.text(FIELD_PHONE_NUMBER),
                format!("{} ", country.dial_code)
            );
        }
    }
}
