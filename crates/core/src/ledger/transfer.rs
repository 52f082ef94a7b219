//! Transfer requests and the two balancing legs they produce.

use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// A request to move `amount` from one account to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Account debited by the transfer.
    pub from_account_id: i64,
    /// Account credited by the transfer.
    pub to_account_id: i64,
    /// Amount moved, in minor units. Must be positive.
    pub amount: i64,
}

/// A signed change to one account's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDelta {
    /// Account the delta applies to.
    pub account_id: i64,
    /// Signed amount added to the balance.
    pub amount: i64,
}

impl TransferRequest {
    /// Creates a new transfer request.
    #[must_use]
    pub const fn new(from_account_id: i64, to_account_id: i64, amount: i64) -> Self {
        Self {
            from_account_id,
            to_account_id,
            amount,
        }
    }

    /// Checks the rules that need no database access.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::NonPositiveAmount`] if `amount <= 0`. A
    /// transfer from an account to itself is valid and nets to zero.
    pub const fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= 0 {
            return Err(LedgerError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }

    /// Whether both legs post to the same account.
    #[must_use]
    pub const fn is_self_transfer(&self) -> bool {
        self.from_account_id == self.to_account_id
    }

    /// The debit leg: `-amount` on the source account.
    #[must_use]
    pub const fn debit(&self) -> BalanceDelta {
        BalanceDelta {
            account_id: self.from_account_id,
            amount: self.amount.saturating_neg(),
        }
    }

    /// The credit leg: `+amount` on the destination account.
    #[must_use]
    pub const fn credit(&self) -> BalanceDelta {
        BalanceDelta {
            account_id: self.to_account_id,
            amount: self.amount,
        }
    }

    /// Account IDs in the order their rows must be locked.
    ///
    /// Every transfer touching the same pair locks in ascending ID order, so
    /// opposing transfers cannot wait on each other. A self-transfer yields
    /// the same ID twice; lock it once.
    #[must_use]
    pub const fn lock_order(&self) -> [i64; 2] {
        if self.from_account_id <= self.to_account_id {
            [self.from_account_id, self.to_account_id]
        } else {
            [self.to_account_id, self.from_account_id]
        }
    }

    /// Both legs, sorted by account ID to match [`Self::lock_order`].
    #[must_use]
    pub const fn deltas_in_lock_order(&self) -> [BalanceDelta; 2] {
        if self.from_account_id <= self.to_account_id {
            [self.debit(), self.credit()]
        } else {
            [self.credit(), self.debit()]
        }
    }
}
