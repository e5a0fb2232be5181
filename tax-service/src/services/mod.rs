//! Services module for tax-service.

pub mod aggregator;
pub mod calculator;
pub mod compliance;
pub mod database;
pub mod gateway;
pub mod metrics;
pub mod returns;
pub mod store;

pub use compliance::ComplianceService;
pub use database::Database;
pub use gateway::{SimulatedIrdGateway, SubmissionGateway, SubmissionReceipt};
pub use metrics::{get_metrics, init_metrics};
pub use returns::ReturnService;
pub use store::TaxStore;
