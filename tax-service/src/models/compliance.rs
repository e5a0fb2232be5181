//! Compliance report model for tax-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Finding severity. Everything here is advisory; nothing blocks a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Issue,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Issue => "issue",
        }
    }
}

/// One advisory finding from the compliance checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceFinding {
    pub severity: Severity,
    pub code: String,
    pub message: String,
}

impl ComplianceFinding {
    pub fn warning(code: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.to_string(),
            message,
        }
    }

    pub fn issue(code: &str, message: String) -> Self {
        Self {
            severity: Severity::Issue,
            code: code.to_string(),
            message,
        }
    }
}

/// Read-only period summary plus advisory findings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub user_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub total_invoiced: Decimal,
    /// Completed payments only.
    pub total_received: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    /// Sum of balance due across unpaid invoices.
    pub outstanding_receivables: Decimal,
    pub findings: Vec<ComplianceFinding>,
    pub generated_utc: DateTime<Utc>,
}
