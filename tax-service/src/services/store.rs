//! Persistence contract for tax-service.
//!
//! The engine's only boundary: everything it needs from its environment is
//! behind this trait, so the PostgreSQL implementation can be swapped for an
//! in-memory one in tests.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use service_core::error::AppError;
use uuid::Uuid;

use crate::models::{
    ExpenseRecord, InvoiceRecord, NewTaxConfiguration, NewTaxReturn, PaymentRecord,
    TaxConfiguration, TaxReturn, TaxType, UpdateTaxReturn,
};

#[async_trait]
pub trait TaxStore: Send + Sync {
    /// The configuration in effect today for a user and country, selected by
    /// effective-date range, or `None` if the user never configured tax.
    async fn active_tax_configuration(
        &self,
        user_id: Uuid,
        country_code: &str,
        tax_type: TaxType,
    ) -> Result<Option<TaxConfiguration>, AppError>;

    /// Insert a configuration, superseding any previously active row for the
    /// same user, country and tax type in the same transaction.
    async fn create_tax_configuration(
        &self,
        input: NewTaxConfiguration,
    ) -> Result<TaxConfiguration, AppError>;

    async fn invoices_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InvoiceRecord>, AppError>;

    async fn expenses_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>, AppError>;

    async fn payments_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, AppError>;

    async fn create_tax_return(&self, input: NewTaxReturn) -> Result<TaxReturn, AppError>;

    async fn get_tax_return(&self, tax_return_id: Uuid) -> Result<Option<TaxReturn>, AppError>;

    /// Patch a draft return. `None` when the return does not exist; a
    /// non-draft return is a bad request.
    async fn update_tax_return(
        &self,
        tax_return_id: Uuid,
        input: UpdateTaxReturn,
    ) -> Result<Option<TaxReturn>, AppError>;

    /// Compare-and-swap submission: flips `draft` to `submitted` and stamps
    /// the IRD reference in one conditional write. `None` when the row was
    /// not a draft at write time, which is how a lost race surfaces.
    async fn mark_submitted(
        &self,
        tax_return_id: Uuid,
        ird_reference: &str,
        submitted_utc: DateTime<Utc>,
    ) -> Result<Option<TaxReturn>, AppError>;

    /// Conditional delete; only drafts are removable. Returns whether a row
    /// was deleted.
    async fn delete_draft(&self, tax_return_id: Uuid) -> Result<bool, AppError>;
}
