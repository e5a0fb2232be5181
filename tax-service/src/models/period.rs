//! Period aggregation models for tax-service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::records::{ExpenseRecord, InvoiceRecord};

/// Expense category with its deduction and GST semantics attached, replacing
/// free-form category strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Equipment,
    Vehicles,
    OfficeSupplies,
    Rent,
    Utilities,
    Travel,
    ProfessionalServices,
    Insurance,
    Entertainment,
    NonDeductible,
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Equipment => "equipment",
            ExpenseCategory::Vehicles => "vehicles",
            ExpenseCategory::OfficeSupplies => "office_supplies",
            ExpenseCategory::Rent => "rent",
            ExpenseCategory::Utilities => "utilities",
            ExpenseCategory::Travel => "travel",
            ExpenseCategory::ProfessionalServices => "professional_services",
            ExpenseCategory::Insurance => "insurance",
            ExpenseCategory::Entertainment => "entertainment",
            ExpenseCategory::NonDeductible => "non_deductible",
            ExpenseCategory::Other => "other",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "equipment" => ExpenseCategory::Equipment,
            "vehicles" => ExpenseCategory::Vehicles,
            "office_supplies" => ExpenseCategory::OfficeSupplies,
            "rent" => ExpenseCategory::Rent,
            "utilities" => ExpenseCategory::Utilities,
            "travel" => ExpenseCategory::Travel,
            "professional_services" => ExpenseCategory::ProfessionalServices,
            "insurance" => ExpenseCategory::Insurance,
            "entertainment" => ExpenseCategory::Entertainment,
            "non_deductible" => ExpenseCategory::NonDeductible,
            _ => ExpenseCategory::Other,
        }
    }

    /// Counts against income for income tax purposes.
    pub fn is_deductible(&self) -> bool {
        !matches!(self, ExpenseCategory::NonDeductible)
    }

    /// Durable asset purchase, reported separately on the GST return.
    pub fn is_capital_good(&self) -> bool {
        matches!(self, ExpenseCategory::Equipment | ExpenseCategory::Vehicles)
    }

    /// Whether GST paid on this category can be claimed as an input credit.
    pub fn gst_claimable(&self) -> bool {
        !matches!(self, ExpenseCategory::NonDeductible)
    }
}

/// One record fed to the period aggregator. Read-only projection of an
/// invoice or expense row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodEntry {
    pub amount: Decimal,
    pub tax_inclusive: bool,
    pub taxable: bool,
}

impl PeriodEntry {
    /// Invoices default to tax-inclusive unless the record states otherwise.
    pub fn from_invoice(invoice: &InvoiceRecord) -> Self {
        Self {
            amount: invoice.total,
            tax_inclusive: invoice.tax_inclusive.unwrap_or(true),
            taxable: invoice.taxable,
        }
    }

    pub fn from_expense(expense: &ExpenseRecord) -> Self {
        Self {
            amount: expense.amount,
            tax_inclusive: expense.tax_inclusive,
            taxable: expense.category().gst_claimable(),
        }
    }
}

/// Sales half of a GST return period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesSummary {
    pub total_sales: Decimal,
    pub gst_on_sales: Decimal,
    pub standard_rated: Decimal,
    pub zero_rated: Decimal,
}

/// Purchases half of a GST return period. There is no zero-rated bucket on
/// this side: non-claimable purchase GST is dropped, not bucketed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PurchaseSummary {
    pub total_purchases: Decimal,
    pub gst_on_purchases: Decimal,
    pub standard_rated: Decimal,
}
