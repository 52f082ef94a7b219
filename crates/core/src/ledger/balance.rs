//! Checks applied to accounts a transfer has locked.

use bubblebank_shared::types::OverdraftPolicy;

use super::error::LedgerError;

/// Fails if the two accounts do not hold the same currency.
///
/// # Errors
///
/// Returns [`LedgerError::CurrencyMismatch`].
pub fn ensure_same_currency(
    from_account_id: i64,
    from_currency: &str,
    to_account_id: i64,
    to_currency: &str,
) -> Result<(), LedgerError> {
    if from_currency == to_currency {
        return Ok(());
    }
    Err(LedgerError::CurrencyMismatch {
        from_account_id,
        from_currency: from_currency.to_string(),
        to_account_id,
        to_currency: to_currency.to_string(),
    })
}

/// Fails if `balance` is not an acceptable post-debit balance under `policy`.
///
/// # Errors
///
/// Returns [`LedgerError::InsufficientFunds`].
pub const fn ensure_within_policy(
    policy: OverdraftPolicy,
    account_id: i64,
    balance: i64,
) -> Result<(), LedgerError> {
    if policy.permits(balance) {
        Ok(())
    } else {
        Err(LedgerError::InsufficientFunds {
            account_id,
            balance,
        })
    }
}
