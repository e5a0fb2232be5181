//! Domain models for tax-service.

mod brackets;
mod calculation;
mod compliance;
mod period;
mod records;
mod tax_configuration;
mod tax_return;

pub use brackets::{BracketTable, TaxBracket};
pub use calculation::{
    round2, CalculationLineItem, LineBreakdown, TaxCalculationRequest, TaxCalculationResult,
    ValidationOutcome,
};
pub use compliance::{ComplianceFinding, ComplianceReport, Severity};
pub use period::{ExpenseCategory, PeriodEntry, PurchaseSummary, SalesSummary};
pub use records::{ExpenseRecord, InvoiceRecord, InvoiceStatus, PaymentRecord, PaymentStatus};
pub use tax_configuration::{NewTaxConfiguration, TaxConfiguration, TaxType};
pub use tax_return::{
    GstAdjustments, GstReturnData, IncomeReturnData, NewTaxReturn, ReturnStatus, ReturnType,
    TaxReturn, UpdateTaxReturn,
};
