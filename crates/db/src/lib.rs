//! Ledger storage engine on `SeaORM`.
//!
//! This crate provides:
//! - `SeaORM` entities for accounts, entries and transfers
//! - The query layer ([`Querier`], [`Queries`])
//! - The transactional executor and transfer workflow ([`SqlStore`])
//! - Tracing and retry decorators over any [`Store`]
//! - Database migrations

pub mod entities;
pub mod error;
pub mod instrumented;
pub mod migration;
pub mod queries;
pub mod retry;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use entities::{Account, Entry, Transfer};
pub use error::{ConstraintKind, StoreError, StoreResult};
pub use instrumented::InstrumentedStore;
pub use queries::{
    AddAccountBalanceParams, CreateAccountParams, CreateEntryParams, CreateTransferParams,
    ListAccountsParams, ListEntriesParams, ListTransfersParams, Querier, Queries,
    UpdateAccountParams,
};
pub use retry::{RetryPolicy, RetryingStore};
pub use store::{SqlStore, Store, TransferTxParams, TransferTxResult};

use bubblebank_shared::config::DatabaseConfig;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// Opens a connection pool sized and timed by `config`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout())
        .acquire_timeout(config.acquire_timeout())
        .sqlx_logging(config.sqlx_logging);

    Database::connect(options).await
}
