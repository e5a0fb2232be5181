//! Return builder for tax-service.
//!
//! Assembles aggregated period figures into GST and income tax returns,
//! owns the draft/submitted state machine, and is the only writer of
//! tax_returns rows. Nothing is persisted until a return is fully assembled
//! and rounded.

use std::sync::Arc;

use anyhow::anyhow;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::TaxError;
use crate::models::{
    round2, BracketTable, GstAdjustments, GstReturnData, IncomeReturnData, NewTaxReturn,
    PeriodEntry, ReturnType, TaxType, TaxReturn, UpdateTaxReturn, ValidationOutcome,
};
use crate::services::aggregator;
use crate::services::calculator::gst_portion;
use crate::services::gateway::SubmissionGateway;
use crate::services::metrics::{RETURNS_TOTAL, SUBMISSIONS_TOTAL};
use crate::services::store::TaxStore;

/// Longest reporting period IRD accepts.
const MAX_PERIOD_DAYS: i64 = 366;

/// Provisional tax is estimated as a flat fraction of the year's liability.
fn provisional_rate() -> Decimal {
    Decimal::new(105, 3)
}

/// Check that a reporting period is usable: start strictly before end, end
/// not in the future, span at most a year.
pub fn validate_period(start: NaiveDate, end: NaiveDate) -> Result<(), TaxError> {
    if start >= end {
        return Err(TaxError::InvalidPeriod(
            "Period start must be before period end".to_string(),
        ));
    }
    if end > Utc::now().date_naive() {
        return Err(TaxError::InvalidPeriod(
            "Period end cannot be in the future".to_string(),
        ));
    }
    if end - start > Duration::days(MAX_PERIOD_DAYS) {
        return Err(TaxError::InvalidPeriod(
            "Reporting period cannot exceed one year".to_string(),
        ));
    }
    Ok(())
}

/// Validate an assembled return before submission. Problems come back as a
/// list so callers can surface them all at once.
pub fn validate_tax_return(tax_return: &TaxReturn) -> ValidationOutcome {
    let mut errors = Vec::new();

    if tax_return.period_start >= tax_return.period_end {
        errors.push("Period start must be before period end".to_string());
    }

    match tax_return.return_type() {
        ReturnType::Gst => {
            if tax_return.total_sales < Decimal::ZERO {
                errors.push("Total sales cannot be negative".to_string());
            }
            if tax_return.total_purchases < Decimal::ZERO {
                errors.push("Total purchases cannot be negative".to_string());
            }
            if tax_return.gst_on_sales < Decimal::ZERO {
                errors.push("GST on sales cannot be negative".to_string());
            }
        }
        ReturnType::IncomeTax => match tax_return.income_data() {
            Some(data) => {
                if data.gross_income < Decimal::ZERO {
                    errors.push("Gross income cannot be negative".to_string());
                }
                if data.allowable_deductions < Decimal::ZERO {
                    errors.push("Allowable deductions cannot be negative".to_string());
                }
            }
            None => errors.push("Income return is missing its breakdown".to_string()),
        },
    }

    ValidationOutcome::from_errors(errors)
}

/// Builds, validates, submits and deletes tax returns.
pub struct ReturnService {
    store: Arc<dyn TaxStore>,
    gateway: Arc<dyn SubmissionGateway>,
    country_code: String,
    brackets: BracketTable,
}

impl ReturnService {
    pub fn new(store: Arc<dyn TaxStore>, gateway: Arc<dyn SubmissionGateway>) -> Self {
        Self {
            store,
            gateway,
            country_code: "NZ".to_string(),
            brackets: BracketTable::nz_default(),
        }
    }

    pub fn with_country(mut self, country_code: &str) -> Self {
        self.country_code = country_code.to_string();
        self
    }

    /// Swap in a different bracket table, e.g. for another tax year.
    pub fn with_brackets(mut self, brackets: BracketTable) -> Self {
        self.brackets = brackets;
        self
    }

    /// Build and persist a draft GST return for the period.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn generate_gst_return(
        &self,
        user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<TaxReturn, TaxError> {
        validate_period(period_start, period_end)?;

        let config = self
            .store
            .active_tax_configuration(user_id, &self.country_code, TaxType::Gst)
            .await?
            .ok_or_else(|| TaxError::MissingTaxConfiguration("GST".to_string()))?;

        // Independent fetches run concurrently; aggregation waits for both.
        let (invoices, expenses) = tokio::try_join!(
            self.store.invoices_by_period(user_id, period_start, period_end),
            self.store.expenses_by_period(user_id, period_start, period_end),
        )?;

        let sales_entries: Vec<PeriodEntry> = invoices
            .iter()
            .filter(|invoice| invoice.counts_as_sale())
            .map(PeriodEntry::from_invoice)
            .collect();
        let purchase_entries: Vec<PeriodEntry> =
            expenses.iter().map(PeriodEntry::from_expense).collect();

        let sales = aggregator::gst_return_sales(&sales_entries, &config);
        let purchases = aggregator::gst_return_purchases(&purchase_entries, &config);

        let capital_goods = expenses
            .iter()
            .filter(|expense| expense.category().is_capital_good())
            .fold(Decimal::ZERO, |acc, expense| round2(acc + expense.amount));
        let bad_debts = invoices
            .iter()
            .filter(|invoice| invoice.is_written_off())
            .fold(Decimal::ZERO, |acc, invoice| {
                let gst = gst_portion(
                    invoice.total,
                    config.rate,
                    invoice.tax_inclusive.unwrap_or(true),
                );
                round2(acc + gst)
            });

        let net_gst = aggregator::net_gst(sales.gst_on_sales, purchases.gst_on_purchases);

        let data = GstReturnData {
            sales_details: sales.clone(),
            purchase_details: purchases.clone(),
            adjustments: GstAdjustments {
                capital_goods,
                bad_debts,
            },
            net_gst,
        };

        let draft = NewTaxReturn {
            user_id,
            period_start,
            period_end,
            return_type: ReturnType::Gst.as_str().to_string(),
            total_sales: sales.total_sales,
            total_purchases: purchases.total_purchases,
            gst_on_sales: sales.gst_on_sales,
            gst_on_purchases: purchases.gst_on_purchases,
            net_gst,
            return_data: serde_json::to_value(&data)
                .map_err(|e| AppError::InternalError(anyhow!("Failed to encode return: {}", e)))?,
        };

        let tax_return = self.store.create_tax_return(draft).await?;
        RETURNS_TOTAL.with_label_values(&["gst", "draft"]).inc();
        info!(
            tax_return_id = %tax_return.tax_return_id,
            net_gst = %tax_return.net_gst,
            "Draft GST return created"
        );
        Ok(tax_return)
    }

    /// Build and persist a draft income tax return for the period.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn generate_income_return(
        &self,
        user_id: Uuid,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<TaxReturn, TaxError> {
        validate_period(period_start, period_end)?;

        let (invoices, expenses) = tokio::try_join!(
            self.store.invoices_by_period(user_id, period_start, period_end),
            self.store.expenses_by_period(user_id, period_start, period_end),
        )?;

        let gross_income = invoices
            .iter()
            .filter(|invoice| invoice.counts_as_sale())
            .fold(Decimal::ZERO, |acc, invoice| round2(acc + invoice.total));
        let allowable_deductions = expenses
            .iter()
            .filter(|expense| expense.category().is_deductible())
            .fold(Decimal::ZERO, |acc, expense| round2(acc + expense.amount));

        let taxable_income = (gross_income - allowable_deductions).max(Decimal::ZERO);
        let tax_due = self.brackets.tax_on(taxable_income);
        let provisional_tax = round2(tax_due * provisional_rate());

        let data = IncomeReturnData {
            gross_income,
            allowable_deductions,
            taxable_income,
            tax_due,
            provisional_tax,
        };

        let draft = NewTaxReturn {
            user_id,
            period_start,
            period_end,
            return_type: ReturnType::IncomeTax.as_str().to_string(),
            total_sales: gross_income,
            total_purchases: allowable_deductions,
            gst_on_sales: Decimal::ZERO,
            gst_on_purchases: Decimal::ZERO,
            net_gst: Decimal::ZERO,
            return_data: serde_json::to_value(&data)
                .map_err(|e| AppError::InternalError(anyhow!("Failed to encode return: {}", e)))?,
        };

        let tax_return = self.store.create_tax_return(draft).await?;
        RETURNS_TOTAL
            .with_label_values(&["income_tax", "draft"])
            .inc();
        info!(
            tax_return_id = %tax_return.tax_return_id,
            tax_due = %tax_due,
            "Draft income tax return created"
        );
        Ok(tax_return)
    }

    /// Validate then file a draft return through the submission gateway.
    ///
    /// The final flip to `submitted` is a compare-and-swap at the store, so
    /// concurrent submissions of the same draft resolve to exactly one
    /// winner; the loser sees the same error as submitting a non-draft.
    /// The gateway is called before the swap: racing submitters may each
    /// reach the gateway, but only the winner's reference is recorded. A
    /// return is never marked submitted without a gateway receipt.
    #[instrument(skip(self), fields(tax_return_id = %tax_return_id))]
    pub async fn submit_tax_return(&self, tax_return_id: Uuid) -> Result<TaxReturn, TaxError> {
        let tax_return = self
            .store
            .get_tax_return(tax_return_id)
            .await?
            .ok_or_else(|| {
                TaxError::Store(AppError::NotFound(anyhow!("Tax return not found")))
            })?;

        if !tax_return.is_draft() {
            return Err(TaxError::InvalidStateTransition(
                "Only draft tax returns can be submitted".to_string(),
            ));
        }

        let outcome = validate_tax_return(&tax_return);
        if !outcome.is_valid {
            return Err(TaxError::InvalidRequest(outcome.errors.join("; ")));
        }

        let receipt = self.gateway.submit(&tax_return).await?;

        match self
            .store
            .mark_submitted(tax_return_id, &receipt.reference, receipt.submitted_utc)
            .await?
        {
            Some(submitted) => {
                SUBMISSIONS_TOTAL
                    .with_label_values(&[&submitted.return_type])
                    .inc();
                info!(
                    tax_return_id = %submitted.tax_return_id,
                    ird_reference = %receipt.reference,
                    "Tax return submitted"
                );
                Ok(submitted)
            }
            // Lost the race: someone else submitted between the read and the swap.
            None => Err(TaxError::InvalidStateTransition(
                "Only draft tax returns can be submitted".to_string(),
            )),
        }
    }

    /// Patch a draft return's figures or breakdown.
    #[instrument(skip(self, input), fields(tax_return_id = %tax_return_id))]
    pub async fn update_tax_return(
        &self,
        tax_return_id: Uuid,
        input: UpdateTaxReturn,
    ) -> Result<TaxReturn, TaxError> {
        let tax_return = self
            .store
            .get_tax_return(tax_return_id)
            .await?
            .ok_or_else(|| {
                TaxError::Store(AppError::NotFound(anyhow!("Tax return not found")))
            })?;

        if !tax_return.is_draft() {
            return Err(TaxError::InvalidStateTransition(
                "Only draft tax returns can be updated".to_string(),
            ));
        }

        self.store
            .update_tax_return(tax_return_id, input)
            .await?
            .ok_or_else(|| {
                TaxError::InvalidStateTransition(
                    "Only draft tax returns can be updated".to_string(),
                )
            })
    }

    /// Remove a draft return.
    #[instrument(skip(self), fields(tax_return_id = %tax_return_id))]
    pub async fn delete_tax_return(&self, tax_return_id: Uuid) -> Result<(), TaxError> {
        let tax_return = self
            .store
            .get_tax_return(tax_return_id)
            .await?
            .ok_or_else(|| {
                TaxError::Store(AppError::NotFound(anyhow!("Tax return not found")))
            })?;

        if !tax_return.is_draft() {
            return Err(TaxError::InvalidStateTransition(
                "Only draft tax returns can be deleted".to_string(),
            ));
        }

        if self.store.delete_draft(tax_return_id).await? {
            info!(tax_return_id = %tax_return_id, "Draft tax return deleted");
            Ok(())
        } else {
            Err(TaxError::InvalidStateTransition(
                "Only draft tax returns can be deleted".to_string(),
            ))
        }
    }
}
