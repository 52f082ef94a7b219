//! Shared types, errors, and configuration for BubbleBank.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes accepted by the ledger
//! - Pagination parameters for list endpoints
//! - Overdraft policy applied by transfers
//! - Application-wide error types
//! - Configuration management and telemetry bootstrap

pub mod config;
pub mod error;
pub mod telemetry;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
