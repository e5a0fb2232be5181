//! Tax calculation request/result models for tax-service.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round a currency amount to two decimal places, half away from zero.
///
/// The engine rounds per line, before summation. Summing rounded lines can
/// drift a cent from rounding the raw total once; that matches IRD-style
/// invoice rounding and is covered by tests as an accepted property.
pub fn round2(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// One priced line in a calculation request. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationLineItem {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub taxable: bool,
}

/// Input to the tax calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationRequest {
    pub items: Vec<CalculationLineItem>,
    /// Whether stated prices already contain the tax component.
    pub tax_inclusive: bool,
    /// Always-taxable surcharge; treated as one more line.
    pub additional_charges: Option<Decimal>,
    pub discounts: Option<Decimal>,
}

/// Per-line echo of how a line was split into subtotal and tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineBreakdown {
    pub description: String,
    pub line_total: Decimal,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub taxable: bool,
}

/// Result of a tax calculation. `total` is always `round2(subtotal + tax_amount)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
    pub tax_rate: Decimal,
    pub tax_name: String,
    pub breakdown: Vec<LineBreakdown>,
}

/// Batched validation outcome; problems are reported as a list rather than
/// failing on the first one so callers can show them all at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationOutcome {
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }
}
