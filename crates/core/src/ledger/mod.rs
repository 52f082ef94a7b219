//! Double-entry ledger rules.
//!
//! - Transfer requests and their two balancing legs
//! - Canonical lock ordering for the accounts a transfer touches
//! - Post-transfer balance checks
//! - Error types for ledger rule violations

pub mod balance;
pub mod error;
pub mod transfer;

#[cfg(test)]
mod transfer_props;

pub use balance::{ensure_same_currency, ensure_within_policy};
pub use error::LedgerError;
pub use transfer::{BalanceDelta, TransferRequest};
