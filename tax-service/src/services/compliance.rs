//! Compliance reporting for tax-service.
//!
//! Read-only advisory summaries over the same period data the return
//! builder uses. Findings never block anything and nothing here mutates
//! state.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::instrument;
use uuid::Uuid;

use crate::error::TaxError;
use crate::models::{
    round2, ComplianceFinding, ComplianceReport, InvoiceRecord, PaymentRecord, PaymentStatus,
};
use crate::services::returns::validate_period;
use crate::services::store::TaxStore;

/// AML-style reporting threshold for a single cash payment.
fn cash_reporting_threshold() -> Decimal {
    Decimal::from(10_000)
}

/// Days after a quarter ends before a GST return is considered late.
/// Mirrors the IRD quarterly filing deadline as a heuristic, nothing more.
const FILING_GRACE_DAYS: i64 = 28;

/// The latest calendar-quarter end on or before `today`.
pub fn most_recent_quarter_end(today: NaiveDate) -> NaiveDate {
    let year = today.year();
    [
        (year - 1, 12, 31),
        (year, 3, 31),
        (year, 6, 30),
        (year, 9, 30),
        (year, 12, 31),
    ]
    .iter()
    .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
    .filter(|date| *date <= today)
    .max()
    .expect("a quarter end always precedes any date")
}

/// Advisory tax compliance checks over one period's records.
pub fn check_tax_compliance(
    invoices: &[InvoiceRecord],
    payments: &[PaymentRecord],
    today: NaiveDate,
) -> Vec<ComplianceFinding> {
    let mut findings = Vec::new();

    for invoice in invoices {
        if invoice.counts_as_sale() && invoice.tax_amount.is_none() {
            findings.push(ComplianceFinding::warning(
                "missing_tax_breakdown",
                format!("Invoice {} has no stored tax breakdown", invoice.invoice_id),
            ));
        }
    }

    let quarter_end = most_recent_quarter_end(today);
    let days_since = (today - quarter_end).num_days();
    if days_since > FILING_GRACE_DAYS {
        findings.push(ComplianceFinding::issue(
            "gst_return_overdue",
            format!(
                "GST return may be overdue: {} days since the quarter ended {}",
                days_since, quarter_end
            ),
        ));
    }

    // Every cash payment over the threshold is reportable, settled or not.
    for payment in payments {
        if payment.is_cash() && payment.amount > cash_reporting_threshold() {
            findings.push(ComplianceFinding::warning(
                "large_cash_transaction",
                format!(
                    "Cash payment {} of {} exceeds the reporting threshold",
                    payment.payment_id, payment.amount
                ),
            ));
        }
    }

    findings
}

/// Derives audit and compliance summaries for a reporting period.
pub struct ComplianceService {
    store: Arc<dyn TaxStore>,
}

impl ComplianceService {
    pub fn new(store: Arc<dyn TaxStore>) -> Self {
        Self { store }
    }

    /// Summarise a period and run the advisory checks.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn generate_compliance_report(
        &self,
        user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<ComplianceReport, TaxError> {
        validate_period(period_start, period_end)?;

        let (invoices, expenses, payments) = tokio::try_join!(
            self.store.invoices_by_period(user_id, period_start, period_end),
            self.store.expenses_by_period(user_id, period_start, period_end),
            self.store.payments_by_period(user_id, period_start, period_end),
        )?;

        let total_invoiced = invoices
            .iter()
            .filter(|invoice| invoice.counts_as_sale())
            .fold(Decimal::ZERO, |acc, invoice| round2(acc + invoice.total));
        let total_received = payments
            .iter()
            .filter(|payment| payment.payment_status() == PaymentStatus::Completed)
            .fold(Decimal::ZERO, |acc, payment| round2(acc + payment.amount));
        let total_expenses = expenses
            .iter()
            .fold(Decimal::ZERO, |acc, expense| round2(acc + expense.amount));
        let outstanding_receivables = invoices
            .iter()
            .filter(|invoice| invoice.is_unpaid())
            .fold(Decimal::ZERO, |acc, invoice| {
                round2(acc + invoice.balance_due)
            });

        let findings = check_tax_compliance(&invoices, &payments, Utc::now().date_naive());

        Ok(ComplianceReport {
            user_id,
            period_start,
            period_end,
            total_invoiced,
            total_received,
            total_expenses,
            net_income: round2(total_received - total_expenses),
            outstanding_receivables,
            findings,
            generated_utc: Utc::now(),
        })
    }
}
