//! The ledger store: query layer plus the transfer workflow.
//!
//! [`SqlStore`] owns the pool. [`SqlStore::exec_tx`] runs a unit of work in
//! one database transaction, and `transfer_tx` uses it to post a transfer,
//! its two entries and both balance updates atomically.

use std::time::Duration;

use async_trait::async_trait;
use bubblebank_core::ledger::{TransferRequest, ensure_same_currency, ensure_within_policy};
use bubblebank_shared::config::StoreConfig;
use bubblebank_shared::types::OverdraftPolicy;
use futures::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::entities::{Account, Entry, Transfer};
use crate::error::{StoreError, StoreResult, classify_commit_error, classify_uncommitted};
use crate::queries::{
    AddAccountBalanceParams, CreateAccountParams, CreateEntryParams, CreateTransferParams,
    ListAccountsParams, ListEntriesParams, ListTransfersParams, Queries, Querier,
    UpdateAccountParams,
};

/// Input for [`Store::transfer_tx`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxParams {
    /// Account debited.
    pub from_account_id: i64,
    /// Account credited.
    pub to_account_id: i64,
    /// Positive amount moved.
    pub amount: i64,
}

impl From<TransferTxParams> for TransferRequest {
    fn from(params: TransferTxParams) -> Self {
        Self::new(params.from_account_id, params.to_account_id, params.amount)
    }
}

/// Everything a committed transfer wrote, as it stands after commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTxResult {
    /// The transfer record.
    pub transfer: Transfer,
    /// Source account after the debit.
    pub from_account: Account,
    /// Destination account after the credit.
    pub to_account: Account,
    /// The `-amount` entry on the source account.
    pub from_entry: Entry,
    /// The `+amount` entry on the destination account.
    pub to_entry: Entry,
}

/// The façade callers depend on: every query plus the transfer workflow.
#[async_trait]
pub trait Store: Querier {
    /// Moves money between two accounts in one transaction.
    ///
    /// # Errors
    ///
    /// - `ConstraintViolation` for a non-positive amount, a self-transfer or
    ///   mismatched currencies. Nothing is written.
    /// - `NotFound` if either account is missing.
    /// - `InsufficientFunds` if the overdraft policy rejects the debit.
    /// - Any backend error from the individual steps.
    async fn transfer_tx(&self, params: TransferTxParams) -> StoreResult<TransferTxResult>;
}

/// [`Store`] backed by a `SeaORM` connection pool.
#[derive(Debug, Clone)]
pub struct SqlStore {
    db: DatabaseConnection,
    transaction_timeout: Duration,
    overdraft: OverdraftPolicy,
}

impl SqlStore {
    /// Creates a store with default settings.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_config(db, &StoreConfig::default())
    }

    /// Creates a store using `config` for timeouts and overdraft policy.
    #[must_use]
    pub const fn with_config(db: DatabaseConnection, config: &StoreConfig) -> Self {
        Self {
            db,
            transaction_timeout: config.transaction_timeout(),
            overdraft: config.overdraft,
        }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn queries(&self) -> Queries<'_, DatabaseConnection> {
        Queries::new(&self.db)
    }

    /// Runs `work` inside one transaction.
    ///
    /// Commits if `work` returns `Ok`; otherwise rolls back and returns the
    /// error from `work`. A failed rollback is logged, never returned. The
    /// whole run, commit included, is bounded by the configured timeout;
    /// on expiry the transaction is dropped, which rolls it back.
    ///
    /// # Errors
    ///
    /// Returns the error from `work`, from `BEGIN`/`COMMIT`, or
    /// [`StoreError::Timeout`]. A connection lost during `COMMIT` yields
    /// [`StoreError::OutcomeUnknown`]; one lost earlier yields
    /// [`StoreError::Connectivity`], since nothing was committed.
    pub async fn exec_tx<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(Queries<'c, DatabaseTransaction>) -> BoxFuture<'c, StoreResult<T>>
            + Send,
    {
        tokio::time::timeout(self.transaction_timeout, self.run_in_transaction(work))
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    async fn run_in_transaction<T, F>(&self, work: F) -> StoreResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(Queries<'c, DatabaseTransaction>) -> BoxFuture<'c, StoreResult<T>>
            + Send,
    {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|err| classify_uncommitted(err.into()))?;
        let outcome = work(Queries::new(&txn))
            .await
            .map_err(classify_uncommitted);

        match outcome {
            Ok(value) => {
                txn.commit().await.map_err(classify_commit_error)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    error!(
                        error = %rollback_err,
                        cause = %err,
                        "Transaction rollback failed"
                    );
                }
                Err(err)
            }
        }
    }
}

/// The transfer unit of work, against any [`Querier`].
///
/// Locks both accounts in ascending id order before writing, so concurrent
/// transfers over the same pair queue instead of deadlocking. A self-transfer
/// locks its one row once; both legs still post and the returned snapshots
/// are the row after the second leg.
pub async fn run_transfer<Q>(
    q: &Q,
    request: TransferRequest,
    overdraft: OverdraftPolicy,
) -> StoreResult<TransferTxResult>
where
    Q: Querier + ?Sized,
{
    let [first_id, second_id] = request.lock_order();
    let first = q.get_account_for_update(first_id).await?;
    let second = if request.is_self_transfer() {
        first.clone()
    } else {
        q.get_account_for_update(second_id).await?
    };
    let (from, to) = if first_id == request.from_account_id {
        (&first, &second)
    } else {
        (&second, &first)
    };
    ensure_same_currency(from.id, &from.currency, to.id, &to.currency)?;

    let transfer = q
        .create_transfer(CreateTransferParams {
            from_account_id: request.from_account_id,
            to_account_id: request.to_account_id,
            amount: request.amount,
        })
        .await?;

    let debit = request.debit();
    let from_entry = q
        .create_entry(CreateEntryParams {
            account_id: debit.account_id,
            amount: debit.amount,
        })
        .await?;

    let credit = request.credit();
    let to_entry = q
        .create_entry(CreateEntryParams {
            account_id: credit.account_id,
            amount: credit.amount,
        })
        .await?;

    let [first_delta, second_delta] = request.deltas_in_lock_order();
    let first_updated = q
        .add_account_balance(AddAccountBalanceParams {
            id: first_delta.account_id,
            amount: first_delta.amount,
        })
        .await?;
    let second_updated = q
        .add_account_balance(AddAccountBalanceParams {
            id: second_delta.account_id,
            amount: second_delta.amount,
        })
        .await?;

    let (from_account, to_account) = if request.is_self_transfer() {
        (second_updated.clone(), second_updated)
    } else if first_delta.account_id == request.from_account_id {
        (first_updated, second_updated)
    } else {
        (second_updated, first_updated)
    };
    ensure_within_policy(overdraft, from_account.id, from_account.balance)?;

    Ok(TransferTxResult {
        transfer,
        from_account,
        to_account,
        from_entry,
        to_entry,
    })
}

#[async_trait]
impl Querier for SqlStore {
    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account> {
        self.queries().create_account(params).await
    }

    async fn get_account(&self, id: i64) -> StoreResult<Account> {
        self.queries().get_account(id).await
    }

    async fn get_account_for_update(&self, id: i64) -> StoreResult<Account> {
        self.queries().get_account_for_update(id).await
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>> {
        self.queries().list_accounts(params).await
    }

    async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account> {
        self.queries().update_account(params).await
    }

    async fn delete_account(&self, id: i64) -> StoreResult<()> {
        self.queries().delete_account(id).await
    }

    async fn add_account_balance(
        &self,
        params: AddAccountBalanceParams,
    ) -> StoreResult<Account> {
        self.queries().add_account_balance(params).await
    }

    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry> {
        self.queries().create_entry(params).await
    }

    async fn get_entry(&self, id: i64) -> StoreResult<Entry> {
        self.queries().get_entry(id).await
    }

    async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>> {
        self.queries().list_entries(params).await
    }

    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer> {
        self.queries().create_transfer(params).await
    }

    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer> {
        self.queries().get_transfer(id).await
    }

    async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>> {
        self.queries().list_transfers(params).await
    }
}

#[async_trait]
impl Store for SqlStore {
    async fn transfer_tx(&self, params: TransferTxParams) -> StoreResult<TransferTxResult> {
        let request = TransferRequest::from(params);
        request.validate()?;

        let overdraft = self.overdraft;
        let result = self
            .exec_tx(move |q| Box::pin(async move { run_transfer(&q, request, overdraft).await }))
            .await?;

        debug!(
            transfer_id = result.transfer.id,
            from_balance = result.from_account.balance,
            to_balance = result.to_account.balance,
            "Transfer committed"
        );
        Ok(result)
    }
}
