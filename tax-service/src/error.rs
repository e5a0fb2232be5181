//! Error taxonomy for tax-service.

use service_core::error::AppError;
use thiserror::Error;

/// Domain errors raised by the tax engine.
///
/// Pure-calculation errors are synchronous and always caller-correctable.
/// Store and state errors arise on the async paths and their messages are
/// surfaced to the user verbatim.
#[derive(Debug, Error)]
pub enum TaxError {
    #[error("No tax configuration supplied")]
    MissingConfiguration,

    #[error("Invalid tax configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid calculation request: {0}")]
    InvalidRequest(String),

    #[error("Invalid reporting period: {0}")]
    InvalidPeriod(String),

    #[error("No active {0} configuration covers this period")]
    MissingTaxConfiguration(String),

    #[error("{0}")]
    InvalidStateTransition(String),

    /// Underlying data-access failure, propagated unwrapped and unretried.
    #[error(transparent)]
    Store(#[from] AppError),
}
