//! Common test utilities for tax-service integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;
use tax_service::models::{
    ExpenseCategory, ExpenseRecord, InvoiceRecord, InvoiceStatus, NewTaxConfiguration,
    NewTaxReturn, PaymentRecord, PaymentStatus, TaxConfiguration, TaxReturn, TaxType,
    UpdateTaxReturn,
};
use tax_service::services::TaxStore;
use uuid::Uuid;

pub const TEST_USER_ID: &str = "00000000-0000-0000-0000-000000000001";

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once per test binary).
pub fn init_tracing() {
    INIT.call_once(|| {
        service_core::observability::init_tracing("tax-service-test", "warn");
    });
}

pub fn test_user() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).expect("valid uuid")
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Active 15% NZ GST configuration effective well before any test period.
pub fn gst_config(user_id: Uuid) -> TaxConfiguration {
    TaxConfiguration {
        tax_config_id: Uuid::new_v4(),
        user_id,
        country_code: "NZ".to_string(),
        tax_type: TaxType::Gst.as_str().to_string(),
        name: "GST".to_string(),
        rate: dec("0.15"),
        applies_to_goods: true,
        applies_to_services: true,
        effective_from: date(2020, 1, 1),
        effective_to: None,
        active: true,
        created_utc: Utc::now(),
    }
}

pub fn invoice(
    user_id: Uuid,
    total: &str,
    status: InvoiceStatus,
    issue_date: NaiveDate,
) -> InvoiceRecord {
    InvoiceRecord {
        invoice_id: Uuid::new_v4(),
        user_id,
        total: dec(total),
        balance_due: if matches!(status, InvoiceStatus::Paid) {
            Decimal::ZERO
        } else {
            dec(total)
        },
        status: status.as_str().to_string(),
        taxable: true,
        tax_inclusive: Some(true),
        tax_amount: Some(dec(total) - (dec(total) / dec("1.15")).round_dp(2)),
        issue_date,
        created_utc: Utc::now(),
    }
}

pub fn expense(
    user_id: Uuid,
    amount: &str,
    category: ExpenseCategory,
    expense_date: NaiveDate,
) -> ExpenseRecord {
    ExpenseRecord {
        expense_id: Uuid::new_v4(),
        user_id,
        amount: dec(amount),
        category: category.as_str().to_string(),
        tax_inclusive: true,
        expense_date,
        description: None,
        created_utc: Utc::now(),
    }
}

pub fn payment(
    user_id: Uuid,
    amount: &str,
    method: &str,
    status: PaymentStatus,
    payment_date: NaiveDate,
) -> PaymentRecord {
    PaymentRecord {
        payment_id: Uuid::new_v4(),
        user_id,
        invoice_id: None,
        amount: dec(amount),
        method: method.to_string(),
        status: status.as_str().to_string(),
        payment_date,
        created_utc: Utc::now(),
    }
}

#[derive(Default)]
struct MemoryState {
    configs: Vec<TaxConfiguration>,
    invoices: Vec<InvoiceRecord>,
    expenses: Vec<ExpenseRecord>,
    payments: Vec<PaymentRecord>,
    returns: HashMap<Uuid, TaxReturn>,
}

/// In-memory `TaxStore` with the same conditional-write semantics as the
/// PostgreSQL implementation, so state-machine tests are hermetic.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        init_tracing();
        Self::default()
    }

    pub fn add_config(&self, config: TaxConfiguration) {
        self.state.lock().expect("lock").configs.push(config);
    }

    /// Every configuration row for a user, active or superseded.
    pub fn configs_for(&self, user_id: Uuid) -> Vec<TaxConfiguration> {
        self.state
            .lock()
            .expect("lock")
            .configs
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn add_invoice(&self, invoice: InvoiceRecord) {
        self.state.lock().expect("lock").invoices.push(invoice);
    }

    pub fn add_expense(&self, expense: ExpenseRecord) {
        self.state.lock().expect("lock").expenses.push(expense);
    }

    pub fn add_payment(&self, payment: PaymentRecord) {
        self.state.lock().expect("lock").payments.push(payment);
    }
}

#[async_trait]
impl TaxStore for MemoryStore {
    async fn active_tax_configuration(
        &self,
        user_id: Uuid,
        country_code: &str,
        tax_type: TaxType,
    ) -> Result<Option<TaxConfiguration>, AppError> {
        let today = Utc::now().date_naive();
        let state = self.state.lock().expect("lock");
        Ok(state
            .configs
            .iter()
            .filter(|c| {
                c.user_id == user_id
                    && c.country_code == country_code
                    && c.tax_type() == tax_type
                    && c.active
                    && c.effective_from <= today
                    && c.effective_to.map_or(true, |to| to >= today)
            })
            .max_by_key(|c| c.effective_from)
            .cloned())
    }

    async fn create_tax_configuration(
        &self,
        input: NewTaxConfiguration,
    ) -> Result<TaxConfiguration, AppError> {
        let mut state = self.state.lock().expect("lock");
        for existing in state.configs.iter_mut().filter(|c| {
            c.user_id == input.user_id
                && c.country_code == input.country_code
                && c.tax_type == input.tax_type
                && c.active
        }) {
            existing.active = false;
            if existing.effective_to.is_none() {
                existing.effective_to = input.effective_from.pred_opt();
            }
        }
        let config = TaxConfiguration {
            tax_config_id: Uuid::new_v4(),
            user_id: input.user_id,
            country_code: input.country_code,
            tax_type: input.tax_type,
            name: input.name,
            rate: input.rate,
            applies_to_goods: input.applies_to_goods,
            applies_to_services: input.applies_to_services,
            effective_from: input.effective_from,
            effective_to: input.effective_to,
            active: true,
            created_utc: Utc::now(),
        };
        state.configs.push(config.clone());
        Ok(config)
    }

    async fn invoices_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<InvoiceRecord>, AppError> {
        let state = self.state.lock().expect("lock");
        Ok(state
            .invoices
            .iter()
            .filter(|i| i.user_id == user_id && i.issue_date >= start && i.issue_date <= end)
            .cloned()
            .collect())
    }

    async fn expenses_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ExpenseRecord>, AppError> {
        let state = self.state.lock().expect("lock");
        Ok(state
            .expenses
            .iter()
            .filter(|e| e.user_id == user_id && e.expense_date >= start && e.expense_date <= end)
            .cloned()
            .collect())
    }

    async fn payments_by_period(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, AppError> {
        let state = self.state.lock().expect("lock");
        Ok(state
            .payments
            .iter()
            .filter(|p| p.user_id == user_id && p.payment_date >= start && p.payment_date <= end)
            .cloned()
            .collect())
    }

    async fn create_tax_return(&self, input: NewTaxReturn) -> Result<TaxReturn, AppError> {
        let tax_return = TaxReturn {
            tax_return_id: Uuid::new_v4(),
            user_id: input.user_id,
            period_start: input.period_start,
            period_end: input.period_end,
            return_type: input.return_type,
            total_sales: input.total_sales,
            total_purchases: input.total_purchases,
            gst_on_sales: input.gst_on_sales,
            gst_on_purchases: input.gst_on_purchases,
            net_gst: input.net_gst,
            status: "draft".to_string(),
            return_data: input.return_data,
            ird_reference: None,
            submitted_utc: None,
            created_utc: Utc::now(),
        };
        self.state
            .lock()
            .expect("lock")
            .returns
            .insert(tax_return.tax_return_id, tax_return.clone());
        Ok(tax_return)
    }

    async fn get_tax_return(&self, tax_return_id: Uuid) -> Result<Option<TaxReturn>, AppError> {
        let state = self.state.lock().expect("lock");
        Ok(state.returns.get(&tax_return_id).cloned())
    }

    async fn update_tax_return(
        &self,
        tax_return_id: Uuid,
        input: UpdateTaxReturn,
    ) -> Result<Option<TaxReturn>, AppError> {
        let mut state = self.state.lock().expect("lock");
        let tax_return = match state.returns.get_mut(&tax_return_id) {
            Some(ret) => ret,
            None => return Ok(None),
        };
        if !tax_return.is_draft() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "Only draft tax returns can be updated"
            )));
        }
        if let Some(v) = input.total_sales {
            tax_return.total_sales = v;
        }
        if let Some(v) = input.total_purchases {
            tax_return.total_purchases = v;
        }
        if let Some(v) = input.gst_on_sales {
            tax_return.gst_on_sales = v;
        }
        if let Some(v) = input.gst_on_purchases {
            tax_return.gst_on_purchases = v;
        }
        if let Some(v) = input.net_gst {
            tax_return.net_gst = v;
        }
        if let Some(v) = input.return_data {
            tax_return.return_data = v;
        }
        Ok(Some(tax_return.clone()))
    }

    async fn mark_submitted(
        &self,
        tax_return_id: Uuid,
        ird_reference: &str,
        submitted_utc: DateTime<Utc>,
    ) -> Result<Option<TaxReturn>, AppError> {
        let mut state = self.state.lock().expect("lock");
        match state.returns.get_mut(&tax_return_id) {
            Some(ret) if ret.is_draft() => {
                ret.status = "submitted".to_string();
                ret.ird_reference = Some(ird_reference.to_string());
                ret.submitted_utc = Some(submitted_utc);
                Ok(Some(ret.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_draft(&self, tax_return_id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.lock().expect("lock");
        match state.returns.get(&tax_return_id) {
            Some(ret) if ret.is_draft() => {
                state.returns.remove(&tax_return_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
