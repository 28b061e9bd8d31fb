//! Form state container.
//!
//! A [`FormState`] owns the live values of one form (or one wizard step),
//! the per-field [`ErrorMap`] and any out-of-band boolean gates such as
//! "terms accepted". Validation never fails the caller: it only populates
//! the error map, which the UI renders inline.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::countries::CountryCatalog;
use crate::phone;
use crate::types::FieldValue;
use crate::validators::{self, FieldError, Rule, ValidationContext};

/// Field key → current error. Absence of a key means the field is valid.
pub type ErrorMap = BTreeMap<String, FieldError>;

// ---------------------------------------------------------------------------
// Definition
// ---------------------------------------------------------------------------

/// Static description of one field.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub rule: Rule,
    pub required: bool,
    pub initial: FieldValue,
}

impl FieldSpec {
    pub fn required(key: &'static str, label: &'static str, rule: Rule) -> Self {
        Self {
            key,
            label,
            rule,
            required: true,
            initial: initial_for(rule),
        }
    }

    pub fn optional(key: &'static str, label: &'static str, rule: Rule) -> Self {
        Self {
            key,
            label,
            rule,
            required: false,
            initial: initial_for(rule),
        }
    }

    pub fn with_initial(mut self, initial: FieldValue) -> Self {
        self.initial = initial;
        self
    }

    /// Keys of sibling fields this field's rule reads.
    fn depends_on(&self) -> Option<&'static str> {
        match self.rule {
            Rule::RequiredWhen { field, .. } => Some(field),
            Rule::Phone { country_field } => Some(country_field),
            _ => None,
        }
    }
}

fn initial_for(rule: Rule) -> FieldValue {
    match rule {
        Rule::Select | Rule::OneOf(_) | Rule::Country => FieldValue::unselected(),
        _ => FieldValue::text(""),
    }
}

/// A country select whose choice seeds the dial-code prefix of a phone
/// field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialCodeLink {
    pub country: &'static str,
    pub phone: &'static str,
}

/// The fields, gates and inter-field links that make up a form.
#[derive(Debug, Clone)]
pub struct FormDefinition {
    name: &'static str,
    fields: Vec<FieldSpec>,
    gates: Vec<&'static str>,
    links: Vec<DialCodeLink>,
}

impl FormDefinition {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
            gates: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Register a boolean gate that must be `true` before submission.
    pub fn gate(mut self, name: &'static str) -> Self {
        self.gates.push(name);
        self
    }

    pub fn dial_code_link(mut self, country: &'static str, phone: &'static str) -> Self {
        self.links.push(DialCodeLink { country, phone });
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn gates(&self) -> &[&'static str] {
        &self.gates
    }

    pub fn spec(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Values, errors and gates of a form at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    pub values: BTreeMap<String, FieldValue>,
    pub errors: ErrorMap,
    pub gates: BTreeMap<String, bool>,
    /// Derived at snapshot time; see [`FormState::is_submittable`].
    pub submittable: bool,
}

impl FormSnapshot {
    pub fn is_submittable(&self) -> bool {
        self.submittable
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> &str {
        self.value(key).map(FieldValue::as_text).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Live state of one form.
#[derive(Debug, Clone)]
pub struct FormState {
    definition: Arc<FormDefinition>,
    countries: Arc<CountryCatalog>,
    values: BTreeMap<String, FieldValue>,
    errors: ErrorMap,
    gates: BTreeMap<String, bool>,
    form_error: Option<String>,
}

impl FormState {
    /// Create a form with the bundled country catalogue.
    pub fn new(definition: FormDefinition) -> Self {
        Self::with_countries(definition, Arc::new(CountryCatalog::fallback()))
    }

    pub fn with_countries(definition: FormDefinition, countries: Arc<CountryCatalog>) -> Self {
        let values = definition
            .fields
            .iter()
            .map(|f| (f.key.to_string(), f.initial.clone()))
            .collect();
        let gates = definition
            .gates
            .iter()
            .map(|g| (g.to_string(), false))
            .collect();

        let mut state = Self {
            definition: Arc::new(definition),
            countries,
            values,
            errors: ErrorMap::new(),
            gates,
            form_error: None,
        };
        state.seed_linked_phones();
        state
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn countries(&self) -> &CountryCatalog {
        &self.countries
    }

    /// Swap in a freshly fetched catalogue (e.g. once the metadata call
    /// resolves).
    pub fn set_countries(&mut self, countries: Arc<CountryCatalog>) {
        self.countries = countries;
        self.seed_linked_phones();
    }

    // -- values --

    /// Update a field value and clear its error.
    ///
    /// Errors on fields whose rule reads `key` are cleared as well. For a
    /// country select linked to a phone field, the phone prefix is re-seeded;
    /// for the phone field itself, the edit is masked so the prefix survives.
    /// Returns `false` (and changes nothing) for unknown keys.
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> bool {
        if self.definition.spec(key).is_none() {
            tracing::warn!(form = self.definition.name, key, "Ignoring update to unknown field");
            return false;
        }

        let value = self.mask_phone_edit(key, value);
        let previous = self.values.insert(key.to_string(), value);

        self.errors.remove(key);
        for dependent in self.dependents_of(key) {
            self.errors.remove(dependent);
        }

        let links: Vec<DialCodeLink> = self
            .definition
            .links
            .iter()
            .filter(|l| l.country == key)
            .copied()
            .collect();
        for link in links {
            self.reseed_phone(link, previous.as_ref());
        }
        true
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn text(&self, key: &str) -> &str {
        self.value(key).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    // -- gates --

    pub fn set_gate(&mut self, name: &str, open: bool) -> bool {
        match self.gates.get_mut(name) {
            Some(gate) => {
                *gate = open;
                true
            }
            None => {
                tracing::warn!(form = self.definition.name, gate = name, "Ignoring unknown gate");
                false
            }
        }
    }

    pub fn gate(&self, name: &str) -> bool {
        self.gates.get(name).copied().unwrap_or(false)
    }

    /// Gates that still block submission, in definition order.
    pub fn closed_gates(&self) -> Vec<&'static str> {
        self.definition
            .gates
            .iter()
            .copied()
            .filter(|g| !self.gate(g))
            .collect()
    }

    // -- validation --

    /// Validate one field (on blur), storing or clearing its error.
    /// Returns whether the field is valid.
    pub fn validate_field(&mut self, key: &str) -> bool {
        let Some(spec) = self.definition.spec(key) else {
            tracing::warn!(form = self.definition.name, key, "Ignoring validation of unknown field");
            return false;
        };
        match self.check(spec) {
            Some(err) => {
                self.errors.insert(key.to_string(), err);
                false
            }
            None => {
                self.errors.remove(key);
                true
            }
        }
    }

    /// Re-run every validator, replacing the whole error map.
    /// Returns whether the form is free of errors.
    pub fn validate_all(&mut self) -> bool {
        self.errors = self.compute_errors();
        self.errors.is_empty()
    }

    /// The error map [`validate_all`](Self::validate_all) would produce,
    /// without storing it.
    pub fn compute_errors(&self) -> ErrorMap {
        self.definition
            .fields
            .iter()
            .filter_map(|spec| self.check(spec).map(|err| (spec.key.to_string(), err)))
            .collect()
    }

    /// Whether submission may fire: no stored errors, no errors a full
    /// validation would find, every required value present and every gate
    /// open.
    pub fn is_submittable(&self) -> bool {
        self.errors.is_empty()
            && self.missing_required().is_empty()
            && self.gates.values().all(|open| *open)
            && self.compute_errors().is_empty()
    }

    /// Keys of required fields that are currently empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        self.definition
            .fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| self.values.get(f.key).map_or(true, FieldValue::is_empty))
            .map(|f| f.key)
            .collect()
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, key: &str) -> Option<&FieldError> {
        self.errors.get(key)
    }

    /// Place an externally produced error (e.g. a backend rejection) on a
    /// field.
    pub fn set_error(&mut self, key: &str, error: FieldError) {
        self.errors.insert(key.to_string(), error);
    }

    // -- top-level alert --

    pub fn set_form_error(&mut self, message: impl Into<String>) {
        self.form_error = Some(message.into());
    }

    pub fn clear_form_error(&mut self) {
        self.form_error = None;
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    // -- snapshots --

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            values: self.values.clone(),
            errors: self.errors.clone(),
            gates: self.gates.clone(),
            submittable: self.is_submittable(),
        }
    }

    /// Rehydrate values, gates and errors from a snapshot. Keys the
    /// definition does not know are dropped.
    pub fn restore(&mut self, snapshot: &FormSnapshot) {
        for (key, value) in &snapshot.values {
            if self.definition.spec(key).is_some() {
                self.values.insert(key.clone(), value.clone());
            }
        }
        for (name, open) in &snapshot.gates {
            if let Some(gate) = self.gates.get_mut(name) {
                *gate = *open;
            }
        }
        self.errors = snapshot
            .errors
            .iter()
            .filter(|(key, _)| self.definition.spec(key).is_some())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }

    // -- private helpers --

    fn check(&self, spec: &FieldSpec) -> Option<FieldError> {
        let ctx = ValidationContext::new(&self.values, &self.countries);
        let empty = FieldValue::text("");
        let value = self.values.get(spec.key).unwrap_or(&empty);
        if let Some(err) = validators::evaluate(spec.rule, value, &ctx) {
            return Some(err);
        }
        if spec.required && value.is_empty() {
            return validators::validate_required_text("");
        }
        None
    }

    fn dependents_of(&self, key: &str) -> BTreeSet<&'static str> {
        self.definition
            .fields
            .iter()
            .filter(|f| f.depends_on() == Some(key))
            .map(|f| f.key)
            .collect()
    }

    fn dial_code_for(&self, country_field: &str) -> Option<String> {
        let code = self.text(country_field);
        self.countries.dial_code(code).map(str::to_string)
    }

    fn mask_phone_edit(&self, key: &str, value: FieldValue) -> FieldValue {
        let Some(link) = self.definition.links.iter().find(|l| l.phone == key) else {
            return value;
        };
        let Some(dial) = self.dial_code_for(link.country) else {
            return value;
        };
        match value {
            FieldValue::Text(raw) => FieldValue::Text(phone::mask_input(&dial, &raw)),
            other => other,
        }
    }

    fn reseed_phone(&mut self, link: DialCodeLink, previous_country: Option<&FieldValue>) {
        let Some(new_dial) = self.dial_code_for(link.country) else {
            return;
        };
        let old_dial = previous_country
            .and_then(FieldValue::as_choice)
            .and_then(|code| self.countries.dial_code(code))
            .map(str::to_string);
        let current = self.text(link.phone).to_string();
        let reseeded = phone::reseed(&current, old_dial.as_deref(), &new_dial);
        self.values
            .insert(link.phone.to_string(), FieldValue::Text(reseeded));
        self.errors.remove(link.phone);
    }

    fn seed_linked_phones(&mut self) {
        let links = self.definition.links.clone();
        for link in links {
            let Some(dial) = self.dial_code_for(link.country) else {
                continue;
            };
            if self.text(link.phone).trim().is_empty() {
                self.values
                    .insert(link.phone.to_string(), FieldValue::Text(phone::seed(&dial)));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::{ErrorKind, OTHER_OPTION};

    fn definition() -> FormDefinition {
        FormDefinition::new("test")
            .field(FieldSpec::required("name", "Name", Rule::RequiredText))
            .field(FieldSpec::required("email", "Email", Rule::BusinessEmail))
            .field(FieldSpec::required("role", "Role", Rule::Select))
            .field(FieldSpec::optional(
                "customRole",
                "Custom role",
                Rule::RequiredWhen {
                    field: "role",
                    equals: OTHER_OPTION,
                },
            ))
            .field(
                FieldSpec::required("country", "Country", Rule::Select)
                    .with_initial(FieldValue::choice("IN")),
            )
            .field(FieldSpec::required(
                "phone",
                "Phone",
                Rule::Phone {
                    country_field: "country",
                },
            ))
            .field(FieldSpec::optional("note", "Note", Rule::OptionalText))
            .gate("terms")
            .dial_code_link("country", "phone")
    }

    fn filled() -> FormState {
        let mut form = FormState::new(definition());
        form.set_field("name", FieldValue::text("John"));
        form.set_field("email", FieldValue::text("john@acme.com"));
        form.set_field("role", FieldValue::choice("CEO"));
        form.set_field("phone", FieldValue::text("+91 9876543210"));
        form.set_gate("terms", true);
        form
    }

    #[test]
    fn new_form_seeds_phone_from_initial_country() {
        let form = FormState::new(definition());
        assert_eq!(form.text("phone"), "+91 ");
    }

    #[test]
    fn set_field_clears_existing_error() {
        let mut form = FormState::new(definition());
        assert!(!form.validate_field("name"));
        assert!(form.error("name").is_some());
        form.set_field("name", FieldValue::text("J"));
        assert!(form.error("name").is_none());
    }

    #[test]
    fn set_field_ignores_unknown_keys() {
        let mut form = FormState::new(definition());
        assert!(!form.set_field("nope", FieldValue::text("x")));
        assert!(form.value("nope").is_none());
    }

    #[test]
    fn changing_country_reseeds_phone_and_keeps_digits() {
        let mut form = FormState::new(definition());
        form.set_field("phone", FieldValue::text("+91 98765"));
        form.set_field("country", FieldValue::choice("GB"));
        assert_eq!(form.text("phone"), "+44 98765");
    }

    #[test]
    fn phone_edit_cannot_remove_prefix() {
        let mut form = FormState::new(definition());
        form.set_field("phone", FieldValue::text("91 "));
        assert_eq!(form.text("phone"), "+91 ");
    }

    #[test]
    fn changing_role_clears_stale_companion_error() {
        let mut form = FormState::new(definition());
        form.set_field("role", FieldValue::choice(OTHER_OPTION));
        form.validate_all();
        assert_eq!(
            form.error("customRole").map(|e| e.kind),
            Some(ErrorKind::MissingRequired)
        );
        form.set_field("role", FieldValue::choice("CTO"));
        assert!(form.error("customRole").is_none());
    }

    #[test]
    fn validate_all_is_idempotent() {
        let mut form = FormState::new(definition());
        form.set_field("email", FieldValue::text("john@gmail.com"));
        form.validate_all();
        let first = form.errors().clone();
        form.validate_all();
        assert_eq!(&first, form.errors());
        assert_eq!(
            first.get("email").map(|e| e.kind),
            Some(ErrorKind::PersonalDomainRejected)
        );
    }

    #[test]
    fn validate_all_replaces_stale_entries() {
        let mut form = filled();
        form.set_error(
            "phone",
            FieldError::new(ErrorKind::InvalidPhoneFormat),
        );
        assert!(form.validate_all());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn submittable_requires_gate() {
        let mut form = filled();
        assert!(form.is_submittable());
        form.set_gate("terms", false);
        assert!(!form.is_submittable());
        assert_eq!(form.closed_gates(), vec!["terms"]);
        form.set_gate("terms", true);
        assert!(form.closed_gates().is_empty());
    }

    #[test]
    fn submittable_agrees_with_validate_all() {
        let mut form = filled();
        form.set_field("email", FieldValue::text("john@acme"));
        let predicted = form.is_submittable();
        let validated = form.validate_all();
        assert!(!predicted);
        assert!(!validated);
    }

    #[test]
    fn is_submittable_has_no_side_effects() {
        let form = FormState::new(definition());
        assert!(!form.is_submittable());
        assert!(form.errors().is_empty());
    }

    #[test]
    fn optional_note_never_blocks() {
        let mut form = filled();
        form.set_field("note", FieldValue::text(""));
        assert!(form.is_submittable());
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let form = filled();
        let snapshot = form.snapshot();
        assert!(snapshot.is_submittable());

        let mut other = FormState::new(definition());
        other.restore(&snapshot);
        assert_eq!(other.values(), form.values());
        assert!(other.gate("terms"));
    }

    #[test]
    fn form_error_does_not_touch_values() {
        let mut form = filled();
        form.set_form_error("Something went wrong");
        assert_eq!(form.form_error(), Some("Something went wrong"));
        assert_eq!(form.text("name"), "John");
        form.clear_form_error();
        assert!(form.form_error().is_none());
    }
}
