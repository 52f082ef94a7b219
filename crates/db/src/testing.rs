//! Test doubles for code that depends on [`Querier`] or [`Store`].
//!
//! Enabled for this crate's own tests and, through the `testing` feature,
//! for downstream crates.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use mockall::mock;

use crate::entities::{Account, Entry, Transfer};
use crate::error::StoreResult;
use crate::queries::{
    AddAccountBalanceParams, CreateAccountParams, CreateEntryParams, CreateTransferParams,
    ListAccountsParams, ListEntriesParams, ListTransfersParams, Querier, UpdateAccountParams,
};
use crate::store::{Store, TransferTxParams, TransferTxResult};

mock! {
    pub QueryLayer {}

    #[async_trait]
    impl Querier for QueryLayer {
        async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account>;
        async fn get_account(&self, id: i64) -> StoreResult<Account>;
        async fn get_account_for_update(&self, id: i64) -> StoreResult<Account>;
        async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>>;
        async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account>;
        async fn delete_account(&self, id: i64) -> StoreResult<()>;
        async fn add_account_balance(&self, params: AddAccountBalanceParams) -> StoreResult<Account>;
        async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry>;
        async fn get_entry(&self, id: i64) -> StoreResult<Entry>;
        async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>>;
        async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer>;
        async fn get_transfer(&self, id: i64) -> StoreResult<Transfer>;
        async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>>;
    }
}

mock! {
    pub LedgerStore {}

    #[async_trait]
    impl Querier for LedgerStore {
        async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account>;
        async fn get_account(&self, id: i64) -> StoreResult<Account>;
        async fn get_account_for_update(&self, id: i64) -> StoreResult<Account>;
        async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>>;
        async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account>;
        async fn delete_account(&self, id: i64) -> StoreResult<()>;
        async fn add_account_balance(&self, params: AddAccountBalanceParams) -> StoreResult<Account>;
        async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry>;
        async fn get_entry(&self, id: i64) -> StoreResult<Entry>;
        async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>>;
        async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer>;
        async fn get_transfer(&self, id: i64) -> StoreResult<Transfer>;
        async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>>;
    }

    #[async_trait]
    impl Store for LedgerStore {
        async fn transfer_tx(&self, params: TransferTxParams) -> StoreResult<TransferTxResult>;
    }
}

/// Fixed timestamp used by the row builders below.
#[must_use]
pub fn fixed_time() -> DateTime<FixedOffset> {
    DateTime::from_timestamp(1_748_131_200, 0)
        .unwrap_or_default()
        .fixed_offset()
}

/// Builds an account row.
#[must_use]
pub fn account(id: i64, balance: i64, currency: &str) -> Account {
    Account {
        id,
        owner: format!("owner{id}"),
        balance,
        currency: currency.to_string(),
        created_at: fixed_time(),
    }
}

/// Builds an entry row.
#[must_use]
pub fn entry(id: i64, account_id: i64, amount: i64) -> Entry {
    Entry {
        id,
        account_id,
        amount,
        created_at: fixed_time(),
    }
}

/// Builds a transfer row.
#[must_use]
pub fn transfer(id: i64, from_account_id: i64, to_account_id: i64, amount: i64) -> Transfer {
    Transfer {
        id,
        from_account_id,
        to_account_id,
        amount,
        created_at: fixed_time(),
    }
}
