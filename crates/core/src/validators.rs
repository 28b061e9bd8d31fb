//! Field validators: pure logic, no form state.
//!
//! Each rule inspects one field value (and, for interdependent fields, a
//! sibling value looked up through [`ValidationContext`]) and reports either
//! nothing or a [`FieldError`].

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::countries::{
    CountryCatalog, GENERIC_MIN_PHONE_DIGITS, TEN_DIGIT_COUNTRIES, TEN_DIGIT_LENGTH,
};
use crate::phone;
use crate::types::FieldValue;

/// Generic `local@domain.tld` shape.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Consumer email providers rejected by the business-email rule.
pub const PERSONAL_EMAIL_DOMAINS: &[&str] = &[
    "gmail.com",
    "googlemail.com",
    "yahoo.com",
    "yahoo.co.in",
    "yahoo.co.uk",
    "ymail.com",
    "rocketmail.com",
    "outlook.com",
    "hotmail.com",
    "live.com",
    "msn.com",
    "aol.com",
    "icloud.com",
    "me.com",
    "mac.com",
    "protonmail.com",
    "proton.me",
    "zohomail.com",
    "mail.com",
    "gmx.com",
    "gmx.net",
    "yandex.com",
    "yandex.ru",
    "rediffmail.com",
    "inbox.com",
    "qq.com",
    "163.com",
];

/// Sentinel select value that requires a companion free-text field.
pub const OTHER_OPTION: &str = "Other";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Category of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequired,
    InvalidFormat,
    InvalidPhoneFormat,
    PersonalDomainRejected,
}

impl ErrorKind {
    /// Message shown under the field when no more specific text applies.
    pub fn default_message(self) -> &'static str {
        match self {
            Self::MissingRequired => "This field is required",
            Self::InvalidFormat => "Please enter a valid email address",
            Self::InvalidPhoneFormat => "Please enter a valid phone number",
            Self::PersonalDomainRejected => "Invalid email id",
        }
    }
}

/// A single failed check, ready to display inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub kind: ErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_string(),
        }
    }

    pub fn with_message(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A stateless rule attached to a field at form-definition time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Non-empty after trimming.
    RequiredText,
    /// `local@domain.tld` on a non-consumer domain.
    BusinessEmail,
    /// An option must be chosen.
    Select,
    /// An option from a fixed list must be chosen.
    OneOf(&'static [&'static str]),
    /// A country present in the catalogue must be chosen.
    Country,
    /// Required only while `field` holds `equals` (e.g. custom role when
    /// role is "Other").
    RequiredWhen {
        field: &'static str,
        equals: &'static str,
    },
    /// Phone number checked against the dial code of the country held in
    /// `country_field`.
    Phone { country_field: &'static str },
    /// A positive amount with at most two decimal places.
    Amount,
    /// Always passes.
    OptionalText,
}

/// Read access to sibling values and the country catalogue.
pub struct ValidationContext<'a> {
    values: &'a BTreeMap<String, FieldValue>,
    countries: &'a CountryCatalog,
}

impl<'a> ValidationContext<'a> {
    pub fn new(values: &'a BTreeMap<String, FieldValue>, countries: &'a CountryCatalog) -> Self {
        Self { values, countries }
    }

    pub fn value(&self, key: &str) -> Option<&'a FieldValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> &'a str {
        self.value(key).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn countries(&self) -> &'a CountryCatalog {
        self.countries
    }
}

/// Run `rule` against `value`.
pub fn evaluate(rule: Rule, value: &FieldValue, ctx: &ValidationContext<'_>) -> Option<FieldError> {
    match rule {
        Rule::RequiredText => validate_required_text(value.as_text()),
        Rule::BusinessEmail => validate_business_email(value.as_text()),
        Rule::Select => validate_select(value.as_choice()),
        Rule::OneOf(options) => validate_one_of(value.as_choice(), options),
        Rule::Country => validate_country(value.as_choice(), ctx.countries()),
        Rule::RequiredWhen { field, equals } => {
            if ctx.text(field) == equals {
                validate_required_text(value.as_text())
            } else {
                None
            }
        }
        Rule::Phone { country_field } => {
            let country = ctx.text(country_field);
            let dial_code = ctx.countries().dial_code(country).unwrap_or("");
            validate_phone(value.as_text(), country, dial_code)
        }
        Rule::Amount => validate_amount(value.as_text()),
        Rule::OptionalText => None,
    }
}

// ---------------------------------------------------------------------------
// Individual validators
// ---------------------------------------------------------------------------

pub fn validate_required_text(value: &str) -> Option<FieldError> {
    if value.trim().is_empty() {
        Some(FieldError::new(ErrorKind::MissingRequired))
    } else {
        None
    }
}

/// Validate a business email address.
///
/// Empty input is reported as missing; a malformed address as
/// [`ErrorKind::InvalidFormat`]; a deny-listed consumer domain as
/// [`ErrorKind::PersonalDomainRejected`].
pub fn validate_business_email(value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Some(FieldError::new(ErrorKind::MissingRequired));
    }
    if !EMAIL_RE.is_match(value) {
        return Some(FieldError::new(ErrorKind::InvalidFormat));
    }
    let domain = value
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_ascii_lowercase())
        .unwrap_or_default();
    if is_personal_domain(&domain) {
        return Some(FieldError::new(ErrorKind::PersonalDomainRejected));
    }
    None
}

pub fn is_personal_domain(domain: &str) -> bool {
    PERSONAL_EMAIL_DOMAINS
        .iter()
        .any(|d| d.eq_ignore_ascii_case(domain))
}

pub fn validate_select(choice: Option<&str>) -> Option<FieldError> {
    match choice {
        Some(c) if !c.trim().is_empty() => None,
        _ => Some(FieldError::new(ErrorKind::MissingRequired)),
    }
}

/// A choice outside `options` is [`ErrorKind::InvalidFormat`].
pub fn validate_one_of(choice: Option<&str>, options: &[&str]) -> Option<FieldError> {
    if let Some(err) = validate_select(choice) {
        return Some(err);
    }
    let choice = choice.unwrap_or_default().trim();
    if options.contains(&choice) {
        None
    } else {
        Some(FieldError::with_message(
            ErrorKind::InvalidFormat,
            "Please select a valid option",
        ))
    }
}

/// The chosen country must exist in the catalogue. An empty catalogue
/// accepts any choice.
pub fn validate_country(choice: Option<&str>, countries: &CountryCatalog) -> Option<FieldError> {
    if let Some(err) = validate_select(choice) {
        return Some(err);
    }
    let code = choice.unwrap_or_default().trim();
    if countries.is_empty() || countries.find(code).is_some() {
        None
    } else {
        Some(FieldError::with_message(
            ErrorKind::InvalidFormat,
            "Please select a valid country",
        ))
    }
}

/// Validate a phone number for the given country.
///
/// India, the US and Canada need exactly ten national digits; every other
/// country needs at least eight. A value holding only the seeded dial code
/// counts as missing.
pub fn validate_phone(value: &str, country_code: &str, dial_code: &str) -> Option<FieldError> {
    let digits = phone::national_digits(value, dial_code);
    if digits.is_empty() {
        return Some(FieldError::new(ErrorKind::MissingRequired));
    }

    let strict = TEN_DIGIT_COUNTRIES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(country_code));
    let ok = if strict {
        digits.len() == TEN_DIGIT_LENGTH
    } else {
        digits.len() >= GENERIC_MIN_PHONE_DIGITS
    };

    if ok {
        None
    } else {
        Some(FieldError::new(ErrorKind::InvalidPhoneFormat))
    }
}

/// Validate a price entered as text, e.g. `49` or `19.99`.
pub fn validate_amount(value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return Some(FieldError::new(ErrorKind::MissingRequired));
    }
    let decimals = value.split_once('.').map_or(0, |(_, frac)| frac.len());
    let parsed = value
        .chars()
        .all(|c| c.is_ascii_digit() || c == '.')
        .then(|| value.parse::<f64>().ok())
        .flatten();
    match parsed {
        Some(amount) if amount > 0.0 && decimals <= 2 => None,
        _ => Some(FieldError::with_message(
            ErrorKind::InvalidFormat,
            "Please enter a valid amount",
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn kind(err: Option<FieldError>) -> Option<ErrorKind> {
        err.map(|e| e.kind)
    }

    // -- required text --

    #[test]
    fn required_text_rejects_blank() {
        assert_eq!(kind(validate_required_text("")), Some(ErrorKind::MissingRequired));
        assert_eq!(kind(validate_required_text("   ")), Some(ErrorKind::MissingRequired));
        assert!(validate_required_text("Acme").is_none());
    }

    // -- business email --

    #[test]
    fn business_email_accepts_company_domain() {
        assert!(validate_business_email("john@acme.com").is_none());
        assert!(validate_business_email("  john@acme.com ").is_none());
    }

    #[test]
    fn business_email_accepts_uncommon_tld() {
        assert!(validate_business_email("ops@startup.technology").is_none());
        assert!(validate_business_email("a.b+c@sub.example.co.in").is_none());
    }

    #[test]
    fn business_email_rejects_personal_domain() {
        let err = validate_business_email("john@gmail.com").unwrap();
        assert_eq!(err.kind, ErrorKind::PersonalDomainRejected);
        assert_eq!(err.message, "Invalid email id");
        assert_eq!(
            kind(validate_business_email("JOHN@Yahoo.COM")),
            Some(ErrorKind::PersonalDomainRejected)
        );
        assert_eq!(
            kind(validate_business_email("jane@outlook.com")),
            Some(ErrorKind::PersonalDomainRejected)
        );
    }

    #[test]
    fn business_email_rejects_bad_shape() {
        assert_eq!(kind(validate_business_email("john@acme")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_business_email("john.acme.com")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_business_email("jo hn@acme.com")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_business_email("@acme.com")), Some(ErrorKind::InvalidFormat));
    }

    #[test]
    fn business_email_missing_when_empty() {
        assert_eq!(kind(validate_business_email("")), Some(ErrorKind::MissingRequired));
    }

    #[test]
    fn subdomain_of_personal_provider_is_not_denied() {
        assert!(validate_business_email("it@corp.gmail.com.example").is_none());
    }

    // -- select --

    #[test]
    fn select_requires_choice() {
        assert_eq!(kind(validate_select(None)), Some(ErrorKind::MissingRequired));
        assert_eq!(kind(validate_select(Some(""))), Some(ErrorKind::MissingRequired));
        assert!(validate_select(Some("CEO")).is_none());
    }

    // -- phone --

    #[test]
    fn one_of_rejects_unlisted_choice() {
        const SIZES: &[&str] = &["_1_10", "_11_50"];
        assert!(validate_one_of(Some("_11_50"), SIZES).is_none());
        assert_eq!(
            validate_one_of(None, SIZES).unwrap().kind,
            ErrorKind::MissingRequired
        );
        let err = validate_one_of(Some("lots"), SIZES).unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidFormat);
        assert_eq!(err.message, "Please select a valid option");
    }

    #[test]
    fn country_must_be_in_catalogue() {
        let catalog = CountryCatalog::fallback();
        assert!(validate_country(Some("DE"), &catalog).is_none());
        assert_eq!(
            validate_country(Some("ZZ"), &catalog).unwrap().kind,
            ErrorKind::InvalidFormat
        );
        assert_eq!(
            validate_country(Some(""), &catalog).unwrap().kind,
            ErrorKind::MissingRequired
        );
        assert!(validate_country(Some("ZZ"), &CountryCatalog::default()).is_none());
    }

    #[test]
    fn india_requires_exactly_ten_digits() {
        assert!(validate_phone("+91 1234567890", "IN", "+91").is_none());
        assert_eq!(
            kind(validate_phone("+91 123456", "IN", "+91")),
            Some(ErrorKind::InvalidPhoneFormat)
        );
        assert_eq!(
            kind(validate_phone("+91 12345678901", "IN", "+91")),
            Some(ErrorKind::InvalidPhoneFormat)
        );
    }

    #[test]
    fn us_and_canada_require_exactly_ten_digits() {
        assert!(validate_phone("+1 (212) 555-1234", "US", "+1").is_none());
        assert!(validate_phone("+1 416 555 0199", "CA", "+1").is_none());
        assert_eq!(
            kind(validate_phone("+1 555 1234", "CA", "+1")),
            Some(ErrorKind::InvalidPhoneFormat)
        );
    }

    #[test]
    fn other_countries_need_at_least_eight_digits() {
        assert!(validate_phone("+44 20794600", "GB", "+44").is_none());
        assert!(validate_phone("+44 7700 900123", "GB", "+44").is_none());
        assert_eq!(
            kind(validate_phone("+65 1234567", "SG", "+65")),
            Some(ErrorKind::InvalidPhoneFormat)
        );
    }

    #[test]
    fn seeded_prefix_alone_is_missing() {
        assert_eq!(
            kind(validate_phone("+91 ", "IN", "+91")),
            Some(ErrorKind::MissingRequired)
        );
    }

    // -- amount --

    #[test]
    fn amount_accepts_positive_prices() {
        assert!(validate_amount("49").is_none());
        assert!(validate_amount("19.99").is_none());
        assert!(validate_amount(" 0.5 ").is_none());
    }

    #[test]
    fn amount_rejects_bad_input() {
        assert_eq!(kind(validate_amount("")), Some(ErrorKind::MissingRequired));
        assert_eq!(kind(validate_amount("0")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_amount("-5")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_amount("1.999")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_amount("ten")), Some(ErrorKind::InvalidFormat));
        assert_eq!(kind(validate_amount("1e3")), Some(ErrorKind::InvalidFormat));
    }

    // -- evaluate --

    #[test]
    fn required_when_only_applies_to_matching_sibling() {
        let countries = CountryCatalog::fallback();
        let mut values = BTreeMap::new();
        values.insert("role".to_string(), FieldValue::choice("CEO"));
        let ctx = ValidationContext::new(&values, &countries);
        let rule = Rule::RequiredWhen {
            field: "role",
            equals: OTHER_OPTION,
        };
        assert!(evaluate(rule, &FieldValue::text(""), &ctx).is_none());

        values.insert("role".to_string(), FieldValue::choice(OTHER_OPTION));
        let ctx = ValidationContext::new(&values, &countries);
        assert_matches!(
            evaluate(rule, &FieldValue::text(" "), &ctx),
            Some(FieldError {
                kind: ErrorKind::MissingRequired,
                ..
            })
        );
        assert!(evaluate(rule, &FieldValue::text("Founder"), &ctx).is_none());
    }

    #[test]
    fn phone_rule_follows_selected_country() {
        let countries = CountryCatalog::fallback();
        let mut values = BTreeMap::new();
        values.insert("country".to_string(), FieldValue::choice("GB"));
        let rule = Rule::Phone {
            country_field: "country",
        };
        let phone = FieldValue::text("+44 12345678");

        let ctx = ValidationContext::new(&values, &countries);
        assert!(evaluate(rule, &phone, &ctx).is_none());

        values.insert("country".to_string(), FieldValue::choice("US"));
        let ctx = ValidationContext::new(&values, &countries);
        assert_matches!(
            evaluate(rule, &FieldValue::text("+1 12345678"), &ctx),
            Some(FieldError {
                kind: ErrorKind::InvalidPhoneFormat,
                ..
            })
        );
    }

    #[test]
    fn optional_text_always_passes() {
        let countries = CountryCatalog::default();
        let values = BTreeMap::new();
        let ctx = ValidationContext::new(&values, &countries);
        assert!(evaluate(Rule::OptionalText, &FieldValue::text(""), &ctx).is_none());
    }
}
