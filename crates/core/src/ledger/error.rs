//! Ledger error types for transfer rule violations.

use thiserror::Error;

/// Errors raised by ledger rules before or during a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transfer amount must be strictly positive.
    #[error("Transfer amount must be positive, got {0}")]
    NonPositiveAmount(i64),

    /// The two accounts hold different currencies.
    #[error(
        "Currency mismatch: account {from_account_id} is {from_currency}, account {to_account_id} is {to_currency}"
    )]
    CurrencyMismatch {
        /// Source account ID.
        from_account_id: i64,
        /// Source account currency.
        from_currency: String,
        /// Destination account ID.
        to_account_id: i64,
        /// Destination account currency.
        to_currency: String,
    },

    // ========== Balance Errors ==========
    /// The debit would leave the source account below zero.
    #[error("Insufficient funds in account {account_id}: balance would be {balance}")]
    InsufficientFunds {
        /// The account that would be overdrawn.
        account_id: i64,
        /// The balance the debit would produce.
        balance: i64,
    },
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - malformed transfer
            Self::NonPositiveAmount(_) | Self::CurrencyMismatch { .. } => 400,

            // 422 Unprocessable - valid request the ledger state refuses
            Self::InsufficientFunds { .. } => 422,
        }
    }
}
