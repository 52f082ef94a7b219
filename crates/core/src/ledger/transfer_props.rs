//! Property-based tests for transfer rules.

use proptest::prelude::*;

use super::error::LedgerError;
use super::transfer::TransferRequest;

/// Strategy for a positive amount in minor units.
fn positive_amount() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for a pair of distinct account IDs.
fn distinct_accounts() -> impl Strategy<Value = (i64, i64)> {
    (1i64..10_000, 1i64..10_000).prop_filter("accounts must differ", |(a, b)| a != b)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any amount <= 0 is rejected, whatever the accounts.
    #[test]
    fn prop_non_positive_amount_rejected(
        (from, to) in distinct_accounts(),
        amount in i64::MIN..=0i64,
    ) {
        let result = TransferRequest::new(from, to, amount).validate();
        prop_assert_eq!(result, Err(LedgerError::NonPositiveAmount(amount)));
    }

    /// The two legs of a valid transfer cancel out.
    #[test]
    fn prop_legs_sum_to_zero(
        (from, to) in distinct_accounts(),
        amount in positive_amount(),
    ) {
        let request = TransferRequest::new(from, to, amount);
        prop_assert!(request.validate().is_ok());
        prop_assert_eq!(request.debit().amount + request.credit().amount, 0);
        prop_assert_eq!(request.debit().account_id, from);
        prop_assert_eq!(request.credit().account_id, to);
    }

    /// A transfer and its reverse lock the same rows in the same order.
    #[test]
    fn prop_lock_order_is_direction_independent(
        (from, to) in distinct_accounts(),
        amount in positive_amount(),
    ) {
        let forward = TransferRequest::new(from, to, amount).lock_order();
        let backward = TransferRequest::new(to, from, amount).lock_order();
        prop_assert_eq!(forward, backward);
        prop_assert!(forward[0] < forward[1]);
    }

    /// Deltas are emitted in the same order as locks are taken.
    #[test]
    fn prop_deltas_match_lock_order(
        (from, to) in distinct_accounts(),
        amount in positive_amount(),
    ) {
        let request = TransferRequest::new(from, to, amount);
        let ids = request.deltas_in_lock_order().map(|delta| delta.account_id);
        prop_assert_eq!(ids, request.lock_order());
    }

    /// A self-transfer is accepted and its legs cancel on the one account.
    #[test]
    fn prop_self_transfer_nets_to_zero(
        account in 1i64..10_000,
        amount in positive_amount(),
    ) {
        let request = TransferRequest::new(account, account, amount);
        prop_assert!(request.validate().is_ok());
        let [first, second] = request.deltas_in_lock_order();
        prop_assert_eq!(first.account_id, account);
        prop_assert_eq!(second.account_id, account);
        prop_assert_eq!(first.amount + second.amount, 0);
    }
}
