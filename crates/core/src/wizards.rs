//! Concrete wizard definitions: Kong connection and rate-plan creation.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::form::{FieldSpec, FormDefinition, FormSnapshot, FormState};
use crate::kong::{self, KongRegion};
use crate::types::FieldValue;
use crate::validators::Rule;
use crate::wizard::{WizardSession, WizardStep};

// ---------------------------------------------------------------------------
// Kong connection wizard
// ---------------------------------------------------------------------------

pub const KONG_STEP_REGION: &str = "region";
pub const KONG_STEP_CREDENTIALS: &str = "credentials";
pub const KONG_STEP_REVIEW: &str = "review";

/// Region → Credentials → Review.
pub fn kong_connection_wizard() -> Result<WizardSession, CoreError> {
    let region = FormState::new(
        FormDefinition::new("kong_region")
            .field(FieldSpec::required(kong::FIELD_REGION, "Region", Rule::Select)),
    );
    let region_step = WizardStep::new(KONG_STEP_REGION, "Select region", region)
        .with_completion(|snap| {
            snap.is_submittable() && KongRegion::from_code(snap.text(kong::FIELD_REGION)).is_ok()
        });

    let credentials = FormState::new(
        FormDefinition::new("kong_credentials")
            .field(
                FieldSpec::required(kong::FIELD_ENDPOINT, "Endpoint", Rule::RequiredText)
                    .with_initial(FieldValue::text(kong::DEFAULT_ENDPOINT)),
            )
            .field(FieldSpec::required(
                kong::FIELD_AUTH_TOKEN,
                "Personal access token",
                Rule::RequiredText,
            )),
    );

    let review = FormState::new(FormDefinition::new("kong_review"));

    WizardSession::new(vec![
        region_step,
        WizardStep::new(KONG_STEP_CREDENTIALS, "Credentials", credentials),
        WizardStep::new(KONG_STEP_REVIEW, "Review & connect", review),
    ])
}

// ---------------------------------------------------------------------------
// Rate-plan wizard
// ---------------------------------------------------------------------------

pub const RATE_PLAN_STEP_DETAILS: &str = "details";
pub const RATE_PLAN_STEP_PRICING: &str = "pricing";
pub const RATE_PLAN_STEP_REVIEW: &str = "review";

pub const FIELD_PLAN_NAME: &str = "planName";
pub const FIELD_PRODUCT: &str = "product";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_BILLING_FREQUENCY: &str = "billingFrequency";
pub const FIELD_PRICING_MODEL: &str = "pricingModel";
pub const FIELD_PRICE: &str = "price";
pub const FIELD_CURRENCY: &str = "currency";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BillingFrequency {
    Monthly,
    Quarterly,
    Annually,
}

impl BillingFrequency {
    pub const WIRE_VALUES: &'static [&'static str] = &["MONTHLY", "QUARTERLY", "ANNUALLY"];

    pub fn from_str_wire(s: &str) -> Result<Self, CoreError> {
        match s {
            "MONTHLY" => Ok(Self::Monthly),
            "QUARTERLY" => Ok(Self::Quarterly),
            "ANNUALLY" => Ok(Self::Annually),
            _ => Err(CoreError::Validation(format!(
                "Invalid billing frequency '{s}'. Must be one of: MONTHLY, QUARTERLY, ANNUALLY"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PricingModel {
    FlatFee,
    PerUnit,
    Tiered,
    Volume,
}

impl PricingModel {
    pub const WIRE_VALUES: &'static [&'static str] = &["FLAT_FEE", "PER_UNIT", "TIERED", "VOLUME"];

    pub fn from_str_wire(s: &str) -> Result<Self, CoreError> {
        match s {
            "FLAT_FEE" => Ok(Self::FlatFee),
            "PER_UNIT" => Ok(Self::PerUnit),
            "TIERED" => Ok(Self::Tiered),
            "VOLUME" => Ok(Self::Volume),
            _ => Err(CoreError::Validation(format!(
                "Invalid pricing model '{s}'. Must be one of: FLAT_FEE, PER_UNIT, TIERED, VOLUME"
            ))),
        }
    }
}

/// Details → Pricing → Review.
pub fn rate_plan_wizard() -> Result<WizardSession, CoreError> {
    let details = FormState::new(
        FormDefinition::new("rate_plan_details")
            .field(FieldSpec::required(FIELD_PLAN_NAME, "Plan name", Rule::RequiredText))
            .field(FieldSpec::required(FIELD_PRODUCT, "Product", Rule::Select))
            .field(FieldSpec::optional(
                FIELD_DESCRIPTION,
                "Description",
                Rule::OptionalText,
            ))
            .field(FieldSpec::required(
                FIELD_BILLING_FREQUENCY,
                "Billing frequency",
                Rule::OneOf(BillingFrequency::WIRE_VALUES),
            )),
    );

    let pricing = FormState::new(
        FormDefinition::new("rate_plan_pricing")
            .field(FieldSpec::required(
                FIELD_PRICING_MODEL,
                "Pricing model",
                Rule::OneOf(PricingModel::WIRE_VALUES),
            ))
            .field(FieldSpec::required(FIELD_PRICE, "Price", Rule::Amount))
            .field(
                FieldSpec::required(FIELD_CURRENCY, "Currency", Rule::Select)
                    .with_initial(FieldValue::choice("USD")),
            ),
    );

    let review = FormState::new(FormDefinition::new("rate_plan_review"));

    WizardSession::new(vec![
        WizardStep::new(RATE_PLAN_STEP_DETAILS, "Plan details", details),
        WizardStep::new(RATE_PLAN_STEP_PRICING, "Pricing", pricing),
        WizardStep::new(RATE_PLAN_STEP_REVIEW, "Review", review),
    ])
}

/// A rate plan ready to be created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatePlanDraft {
    pub plan_name: String,
    pub product: String,
    pub description: Option<String>,
    pub billing_frequency: BillingFrequency,
    pub pricing_model: PricingModel,
    pub price: f64,
    pub currency: String,
}

impl RatePlanDraft {
    pub fn from_snapshots(steps: &[FormSnapshot]) -> Result<Self, CoreError> {
        let find = |key: &str| {
            steps
                .iter()
                .find_map(|s| s.value(key))
                .map(|v| v.as_text().trim().to_string())
                .unwrap_or_default()
        };

        let price_text = find(FIELD_PRICE);
        let price = price_text
            .parse::<f64>()
            .map_err(|_| CoreError::Validation(format!("Invalid price '{price_text}'")))?;
        let description = find(FIELD_DESCRIPTION);

        Ok(Self {
            plan_name: find(FIELD_PLAN_NAME),
            product: find(FIELD_PRODUCT),
            description: (!description.is_empty()).then_some(description),
            billing_frequency: BillingFrequency::from_str_wire(&find(FIELD_BILLING_FREQUENCY))?,
            pricing_model: PricingModel::from_str_wire(&find(FIELD_PRICING_MODEL))?,
            price,
            currency: find(FIELD_CURRENCY),
        })
    }
}
