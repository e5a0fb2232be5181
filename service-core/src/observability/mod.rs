//! Observability utilities shared by the accounting services.

mod logging;

pub use logging::init_tracing;
