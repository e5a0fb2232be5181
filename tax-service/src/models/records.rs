//! Collaborator record models for tax-service.
//!
//! Invoices, expenses and payments are owned by the surrounding application;
//! the tax engine only reads them for a reporting period.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::period::ExpenseCategory;

/// Invoice lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
    Overdue,
    WrittenOff,
    Cancelled,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::WrittenOff => "written_off",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "sent" => InvoiceStatus::Sent,
            "paid" => InvoiceStatus::Paid,
            "overdue" => InvoiceStatus::Overdue,
            "written_off" => InvoiceStatus::WrittenOff,
            "cancelled" => InvoiceStatus::Cancelled,
            _ => InvoiceStatus::Draft,
        }
    }
}

/// Invoice row as read for period reporting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InvoiceRecord {
    pub invoice_id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub balance_due: Decimal,
    pub status: String,
    /// False for zero-rated supplies such as exports.
    pub taxable: bool,
    pub tax_inclusive: Option<bool>,
    /// Stored tax breakdown; absence is a compliance warning, not an error.
    pub tax_amount: Option<Decimal>,
    pub issue_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

impl InvoiceRecord {
    pub fn invoice_status(&self) -> InvoiceStatus {
        InvoiceStatus::from_string(&self.status)
    }

    /// Drafts and cancellations never reach a return or report.
    pub fn counts_as_sale(&self) -> bool {
        !matches!(
            self.invoice_status(),
            InvoiceStatus::Draft | InvoiceStatus::Cancelled
        )
    }

    pub fn is_unpaid(&self) -> bool {
        matches!(
            self.invoice_status(),
            InvoiceStatus::Sent | InvoiceStatus::Overdue
        )
    }

    pub fn is_written_off(&self) -> bool {
        self.invoice_status() == InvoiceStatus::WrittenOff
    }
}

/// Expense row as read for period reporting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExpenseRecord {
    pub expense_id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub category: String,
    pub tax_inclusive: bool,
    pub expense_date: NaiveDate,
    pub description: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl ExpenseRecord {
    pub fn category(&self) -> ExpenseCategory {
        ExpenseCategory::from_string(&self.category)
    }
}

/// Payment settlement status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "completed" => PaymentStatus::Completed,
            "failed" => PaymentStatus::Failed,
            _ => PaymentStatus::Pending,
        }
    }
}

/// Payment row as read for period reporting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentRecord {
    pub payment_id: Uuid,
    pub user_id: Uuid,
    pub invoice_id: Option<Uuid>,
    pub amount: Decimal,
    pub method: String,
    pub status: String,
    pub payment_date: NaiveDate,
    pub created_utc: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_string(&self.status)
    }

    pub fn is_cash(&self) -> bool {
        self.method == "cash"
    }
}
