//! IRD submission gateway for tax-service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use tracing::info;
use uuid::Uuid;

use crate::models::TaxReturn;

/// Acknowledgement returned by the tax authority on filing.
#[derive(Debug, Clone)]
pub struct SubmissionReceipt {
    pub reference: String,
    pub submitted_utc: DateTime<Utc>,
}

/// Filing capability. The return builder's state machine only ever talks to
/// this trait, so a real IRD gateway client can replace the simulation
/// without touching it.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, tax_return: &TaxReturn) -> Result<SubmissionReceipt, AppError>;
}

/// Stand-in for the real IRD gateway: accepts every valid return and
/// fabricates an opaque reference.
#[derive(Debug, Clone, Default)]
pub struct SimulatedIrdGateway;

#[async_trait]
impl SubmissionGateway for SimulatedIrdGateway {
    async fn submit(&self, tax_return: &TaxReturn) -> Result<SubmissionReceipt, AppError> {
        let token = Uuid::new_v4().simple().to_string();
        let reference = format!("IRD-{}", token[..12].to_uppercase());

        info!(
            tax_return_id = %tax_return.tax_return_id,
            return_type = %tax_return.return_type,
            reference = %reference,
            "Simulated IRD submission accepted"
        );

        Ok(SubmissionReceipt {
            reference,
            submitted_utc: Utc::now(),
        })
    }
}
