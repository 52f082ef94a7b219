//! Tracing decorator for any [`Store`].
//!
//! Each call runs inside a span named `store.<operation>` carrying the call
//! arguments, `duration_ms`, `outcome` and, on failure, `error.kind` and
//! `error.message`. Arguments, results and errors pass through untouched.

use std::future::Future;
use std::time::Instant;

use async_trait::async_trait;
use tracing::field::{Empty, display};
use tracing::{Instrument, Span, warn};

use crate::entities::{Account, Entry, Transfer};
use crate::error::StoreResult;
use crate::queries::{
    AddAccountBalanceParams, CreateAccountParams, CreateEntryParams, CreateTransferParams,
    ListAccountsParams, ListEntriesParams, ListTransfersParams, Querier, UpdateAccountParams,
};
use crate::store::{Store, TransferTxParams, TransferTxResult};

macro_rules! store_span {
    ($name:literal, $($fields:tt)+) => {
        tracing::info_span!(
            $name,
            $($fields)+,
            duration_ms = Empty,
            outcome = Empty,
            error.kind = Empty,
            error.message = Empty
        )
    };
}

/// Runs `fut` inside `span` and records timing and outcome on it.
async fn observe<T, F>(span: &Span, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let started = Instant::now();
    let result = fut.instrument(span.clone()).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    span.record("duration_ms", elapsed_ms);
    match &result {
        Ok(_) => {
            span.record("outcome", "ok");
        }
        Err(err) => {
            span.record("outcome", "error");
            span.record("error.kind", err.error_code());
            span.record("error.message", display(err));
            span.in_scope(|| warn!(error = %err, "Store operation failed"));
        }
    }
    result
}

/// [`Store`] decorator that traces every call.
#[derive(Debug, Clone)]
pub struct InstrumentedStore<S> {
    inner: S,
}

impl<S: Store> InstrumentedStore<S> {
    /// Wraps `inner`.
    #[must_use]
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Store> Querier for InstrumentedStore<S> {
    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account> {
        let span = store_span!(
            "store.create_account",
            account.owner = %params.owner,
            account.currency = %params.currency,
            account.balance = params.balance,
            account.id = Empty
        );
        let result = observe(&span, self.inner.create_account(params)).await;
        if let Ok(account) = &result {
            span.record("account.id", account.id);
        }
        result
    }

    async fn get_account(&self, id: i64) -> StoreResult<Account> {
        let span = store_span!("store.get_account", account.id = id, account.balance = Empty);
        let result = observe(&span, self.inner.get_account(id)).await;
        if let Ok(account) = &result {
            span.record("account.balance", account.balance);
        }
        result
    }

    async fn get_account_for_update(&self, id: i64) -> StoreResult<Account> {
        let span = store_span!(
            "store.get_account_for_update",
            account.id = id,
            account.balance = Empty
        );
        let result = observe(&span, self.inner.get_account_for_update(id)).await;
        if let Ok(account) = &result {
            span.record("account.balance", account.balance);
        }
        result
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>> {
        let span = store_span!(
            "store.list_accounts",
            limit = params.limit,
            offset = params.offset,
            accounts_count = Empty
        );
        let result = observe(&span, self.inner.list_accounts(params)).await;
        if let Ok(accounts) = &result {
            span.record("accounts_count", accounts.len());
        }
        result
    }

    async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account> {
        let span = store_span!(
            "store.update_account",
            account.id = params.id,
            account.balance = params.balance
        );
        observe(&span, self.inner.update_account(params)).await
    }

    async fn delete_account(&self, id: i64) -> StoreResult<()> {
        let span = store_span!("store.delete_account", account.id = id);
        observe(&span, self.inner.delete_account(id)).await
    }

    async fn add_account_balance(
        &self,
        params: AddAccountBalanceParams,
    ) -> StoreResult<Account> {
        let span = store_span!(
            "store.add_account_balance",
            account.id = params.id,
            amount = params.amount,
            account.balance = Empty
        );
        let result = observe(&span, self.inner.add_account_balance(params)).await;
        if let Ok(account) = &result {
            span.record("account.balance", account.balance);
        }
        result
    }

    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry> {
        let span = store_span!(
            "store.create_entry",
            entry.account_id = params.account_id,
            entry.amount = params.amount,
            entry.id = Empty
        );
        let result = observe(&span, self.inner.create_entry(params)).await;
        if let Ok(entry) = &result {
            span.record("entry.id", entry.id);
        }
        result
    }

    async fn get_entry(&self, id: i64) -> StoreResult<Entry> {
        let span = store_span!("store.get_entry", entry.id = id);
        observe(&span, self.inner.get_entry(id)).await
    }

    async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>> {
        let span = store_span!(
            "store.list_entries",
            entry.account_id = params.account_id,
            limit = params.limit,
            offset = params.offset,
            entries_count = Empty
        );
        let result = observe(&span, self.inner.list_entries(params)).await;
        if let Ok(entries) = &result {
            span.record("entries_count", entries.len());
        }
        result
    }

    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer> {
        let span = store_span!(
            "store.create_transfer",
            transfer.from_account_id = params.from_account_id,
            transfer.to_account_id = params.to_account_id,
            transfer.amount = params.amount,
            transfer.id = Empty
        );
        let result = observe(&span, self.inner.create_transfer(params)).await;
        if let Ok(transfer) = &result {
            span.record("transfer.id", transfer.id);
        }
        result
    }

    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer> {
        let span = store_span!("store.get_transfer", transfer.id = id);
        observe(&span, self.inner.get_transfer(id)).await
    }

    async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>> {
        let span = store_span!(
            "store.list_transfers",
            transfer.from_account_id = params.from_account_id,
            transfer.to_account_id = params.to_account_id,
            limit = params.limit,
            offset = params.offset,
            transfers_count = Empty
        );
        let result = observe(&span, self.inner.list_transfers(params)).await;
        if let Ok(transfers) = &result {
            span.record("transfers_count", transfers.len());
        }
        result
    }
}

#[async_trait]
impl<S: Store> Store for InstrumentedStore<S> {
    async fn transfer_tx(&self, params: TransferTxParams) -> StoreResult<TransferTxResult> {
        let span = store_span!(
            "store.transfer_tx",
            transfer.from_account_id = params.from_account_id,
            transfer.to_account_id = params.to_account_id,
            transfer.amount = params.amount,
            transfer.id = Empty,
            from_account.final_balance = Empty,
            to_account.final_balance = Empty
        );
        let result = observe(&span, self.inner.transfer_tx(params)).await;
        if let Ok(outcome) = &result {
            span.record("transfer.id", outcome.transfer.id);
            span.record("from_account.final_balance", outcome.from_account.balance);
            span.record("to_account.final_balance", outcome.to_account.balance);
        }
        result
    }
}
