//! Tax return model for tax-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::period::{PurchaseSummary, SalesSummary};

/// Return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnType {
    Gst,
    IncomeTax,
}

impl ReturnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnType::Gst => "gst",
            ReturnType::IncomeTax => "income_tax",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "income_tax" => ReturnType::IncomeTax,
            _ => ReturnType::Gst,
        }
    }
}

/// Two-state return lifecycle. `draft -> submitted` is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnStatus {
    Draft,
    Submitted,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Draft => "draft",
            ReturnStatus::Submitted => "submitted",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "submitted" => ReturnStatus::Submitted,
            _ => ReturnStatus::Draft,
        }
    }
}

/// Adjustments section of a GST return.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GstAdjustments {
    pub capital_goods: Decimal,
    pub bad_debts: Decimal,
}

/// Structured breakdown persisted with a GST return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GstReturnData {
    pub sales_details: SalesSummary,
    pub purchase_details: PurchaseSummary,
    pub adjustments: GstAdjustments,
    pub net_gst: Decimal,
}

/// Structured breakdown persisted with an income tax return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeReturnData {
    pub gross_income: Decimal,
    pub allowable_deductions: Decimal,
    pub taxable_income: Decimal,
    pub tax_due: Decimal,
    /// Flat 10.5% estimate of next year's liability, not a precise figure.
    pub provisional_tax: Decimal,
}

/// Persisted tax return. Only a draft may be mutated, validated or deleted;
/// once submitted the row is append-only and `ird_reference`/`submitted_utc`
/// are set exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaxReturn {
    pub tax_return_id: Uuid,
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub return_type: String,
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub gst_on_sales: Decimal,
    pub gst_on_purchases: Decimal,
    pub net_gst: Decimal,
    pub status: String,
    pub return_data: serde_json::Value,
    pub ird_reference: Option<String>,
    pub submitted_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl TaxReturn {
    pub fn return_type(&self) -> ReturnType {
        ReturnType::from_string(&self.return_type)
    }

    pub fn is_draft(&self) -> bool {
        ReturnStatus::from_string(&self.status) == ReturnStatus::Draft
    }

    pub fn gst_data(&self) -> Option<GstReturnData> {
        serde_json::from_value(self.return_data.clone()).ok()
    }

    pub fn income_data(&self) -> Option<IncomeReturnData> {
        serde_json::from_value(self.return_data.clone()).ok()
    }
}

/// Input for persisting a freshly assembled draft return.
#[derive(Debug, Clone)]
pub struct NewTaxReturn {
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub return_type: String,
    pub total_sales: Decimal,
    pub total_purchases: Decimal,
    pub gst_on_sales: Decimal,
    pub gst_on_purchases: Decimal,
    pub net_gst: Decimal,
    pub return_data: serde_json::Value,
}

/// Input for updating a draft return.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaxReturn {
    pub total_sales: Option<Decimal>,
    pub total_purchases: Option<Decimal>,
    pub gst_on_sales: Option<Decimal>,
    pub gst_on_purchases: Option<Decimal>,
    pub net_gst: Option<Decimal>,
    pub return_data: Option<serde_json::Value>,
}
