//! Retry decorator for transient store failures.
//!
//! Only errors where [`StoreError::is_retryable`] holds are retried. Each
//! retry re-runs the whole operation, so a `transfer_tx` retry starts a
//! fresh transaction.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use bubblebank_shared::config::RetryConfig;
use tracing::{info, warn};

use crate::entities::{Account, Entry, Transfer};
use crate::error::StoreResult;
use crate::queries::{
    AddAccountBalanceParams, CreateAccountParams, CreateEntryParams, CreateTransferParams,
    ListAccountsParams, ListEntriesParams, ListTransfersParams, Querier, UpdateAccountParams,
};
use crate::store::{Store, TransferTxParams, TransferTxResult};

/// Exponential backoff bounded by attempts and a delay cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy. `max_attempts` counts the first try; zero is treated as one.
    #[must_use]
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Total attempts, the first one included.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after the `failed_attempts`-th failure: `base * 2^(n-1)`, capped.
    #[must_use]
    pub fn delay_for(&self, failed_attempts: u32) -> Duration {
        let factor = 1u32
            .checked_shl(failed_attempts.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Runs `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// # Errors
    ///
    /// Returns the last error produced by `operation`.
    pub async fn run<T, F, Fut>(&self, name: &'static str, mut operation: F) -> StoreResult<T>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = StoreResult<T>> + Send,
        T: Send,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        operation = name,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying store operation"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Ok(value) => {
                    if attempt > 1 {
                        info!(operation = name, attempt, "Store operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}

/// [`Store`] decorator that re-runs calls failing with a retryable error.
#[derive(Debug, Clone)]
pub struct RetryingStore<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: Store> RetryingStore<S> {
    /// Wraps `inner` with `policy`.
    #[must_use]
    pub const fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// The wrapped store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: Store> Querier for RetryingStore<S> {
    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account> {
        self.policy
            .run("create_account", || self.inner.create_account(params.clone()))
            .await
    }

    async fn get_account(&self, id: i64) -> StoreResult<Account> {
        self.policy
            .run("get_account", || self.inner.get_account(id))
            .await
    }

    async fn get_account_for_update(&self, id: i64) -> StoreResult<Account> {
        self.policy
            .run("get_account_for_update", || {
                self.inner.get_account_for_update(id)
            })
            .await
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>> {
        self.policy
            .run("list_accounts", || self.inner.list_accounts(params))
            .await
    }

    async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account> {
        self.policy
            .run("update_account", || self.inner.update_account(params))
            .await
    }

    async fn delete_account(&self, id: i64) -> StoreResult<()> {
        self.policy
            .run("delete_account", || self.inner.delete_account(id))
            .await
    }

    async fn add_account_balance(
        &self,
        params: AddAccountBalanceParams,
    ) -> StoreResult<Account> {
        self.policy
            .run("add_account_balance", || {
                self.inner.add_account_balance(params)
            })
            .await
    }

    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry> {
        self.policy
            .run("create_entry", || self.inner.create_entry(params))
            .await
    }

    async fn get_entry(&self, id: i64) -> StoreResult<Entry> {
        self.policy
            .run("get_entry", || self.inner.get_entry(id))
            .await
    }

    async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>> {
        self.policy
            .run("list_entries", || self.inner.list_entries(params))
            .await
    }

    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer> {
        self.policy
            .run("create_transfer", || self.inner.create_transfer(params))
            .await
    }

    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer> {
        self.policy
            .run("get_transfer", || self.inner.get_transfer(id))
            .await
    }

    async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>> {
        self.policy
            .run("list_transfers", || self.inner.list_transfers(params))
            .await
    }
}

#[async_trait]
impl<S: Store> Store for RetryingStore<S> {
    async fn transfer_tx(&self, params: TransferTxParams) -> StoreResult<TransferTxResult> {
        self.policy
            .run("transfer_tx", || self.inner.transfer_tx(params))
            .await
    }
}
