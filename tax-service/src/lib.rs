//! Tax Service - NZ GST and income tax return engine.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
