//! Tax configuration model for tax-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Tax regime a configuration applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxType {
    Gst,
    IncomeTax,
}

impl TaxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxType::Gst => "gst",
            TaxType::IncomeTax => "income_tax",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "income_tax" => TaxType::IncomeTax,
            _ => TaxType::Gst,
        }
    }
}

/// Tax configuration, immutable per period. Exactly one row is active for a
/// user and country at any instant, selected by effective-date range. Rate
/// changes supersede the old row (set `effective_to`, insert a new one)
/// rather than editing it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxConfiguration {
    pub tax_config_id: Uuid,
    pub user_id: Uuid,
    pub country_code: String,
    pub tax_type: String,
    pub name: String,
    /// Fraction in [0, 1], e.g. 0.15 for NZ GST.
    pub rate: Decimal,
    pub applies_to_goods: bool,
    pub applies_to_services: bool,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
}

impl TaxConfiguration {
    pub fn tax_type(&self) -> TaxType {
        TaxType::from_string(&self.tax_type)
    }
}

/// Input for creating a tax configuration.
#[derive(Debug, Clone)]
pub struct NewTaxConfiguration {
    pub user_id: Uuid,
    pub country_code: String,
    pub tax_type: String,
    pub name: String,
    pub rate: Decimal,
    pub applies_to_goods: bool,
    pub applies_to_services: bool,
    pub effective_from: NaiveDate,
    pub effective_to: Option<NaiveDate>,
}

impl NewTaxConfiguration {
    /// Default NZ GST configuration (15%), used when a user has never
    /// configured tax explicitly.
    pub fn nz_gst(user_id: Uuid, effective_from: NaiveDate) -> Self {
        Self {
            user_id,
            country_code: "NZ".to_string(),
            tax_type: TaxType::Gst.as_str().to_string(),
            name: "GST".to_string(),
            rate: Decimal::new(15, 2),
            applies_to_goods: true,
            applies_to_services: true,
            effective_from,
            effective_to: None,
        }
    }
}
