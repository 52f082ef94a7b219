//! Query layer: one method per ledger statement.
//!
//! [`Queries`] runs against any `SeaORM` connection, so the same code serves
//! the pool (`DatabaseConnection`) and an open `DatabaseTransaction`.

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use crate::entities::{Account, Entry, Transfer, accounts, entries, transfers};
use crate::error::{StoreError, StoreResult};

/// Input for creating an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountParams {
    /// Account holder.
    pub owner: String,
    /// Opening balance.
    pub balance: i64,
    /// Currency code.
    pub currency: String,
}

/// Input for listing accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListAccountsParams {
    /// Maximum rows returned.
    pub limit: u64,
    /// Rows skipped, in ascending id order.
    pub offset: u64,
}

/// Input for overwriting an account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccountParams {
    /// Account to update.
    pub id: i64,
    /// New absolute balance.
    pub balance: i64,
}

/// Input for an atomic balance increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAccountBalanceParams {
    /// Account to update.
    pub id: i64,
    /// Signed delta added to the balance.
    pub amount: i64,
}

/// Input for creating an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntryParams {
    /// Account the entry belongs to.
    pub account_id: i64,
    /// Signed amount.
    pub amount: i64,
}

/// Input for listing one account's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntriesParams {
    /// Account whose entries are listed.
    pub account_id: i64,
    /// Maximum rows returned.
    pub limit: u64,
    /// Rows skipped.
    pub offset: u64,
}

/// Input for creating a transfer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransferParams {
    /// Debited account.
    pub from_account_id: i64,
    /// Credited account.
    pub to_account_id: i64,
    /// Positive amount.
    pub amount: i64,
}

/// Input for listing transfers.
///
/// Matches rows where `from_account_id = from` OR `to_account_id = to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListTransfersParams {
    /// Source account filter.
    pub from_account_id: i64,
    /// Destination account filter.
    pub to_account_id: i64,
    /// Maximum rows returned.
    pub limit: u64,
    /// Rows skipped.
    pub offset: u64,
}

/// Every statement the ledger issues.
///
/// All methods are single statements; none opens a transaction.
#[async_trait]
pub trait Querier: Send + Sync {
    /// Inserts an account.
    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account>;

    /// Fetches an account by id.
    async fn get_account(&self, id: i64) -> StoreResult<Account>;

    /// Fetches an account and takes a `FOR NO KEY UPDATE` row lock.
    ///
    /// The lock only outlives the statement inside a transaction.
    async fn get_account_for_update(&self, id: i64) -> StoreResult<Account>;

    /// Lists accounts in ascending id order.
    async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>>;

    /// Overwrites an account balance.
    async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account>;

    /// Deletes an account. Fails while entries or transfers reference it.
    async fn delete_account(&self, id: i64) -> StoreResult<()>;

    /// Adds a signed delta to a balance in one statement.
    async fn add_account_balance(&self, params: AddAccountBalanceParams)
    -> StoreResult<Account>;

    /// Inserts an entry. The amount may have any sign.
    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry>;

    /// Fetches an entry by id.
    async fn get_entry(&self, id: i64) -> StoreResult<Entry>;

    /// Lists an account's entries in ascending id order.
    async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>>;

    /// Inserts a transfer record.
    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer>;

    /// Fetches a transfer by id.
    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer>;

    /// Lists transfers in ascending id order.
    async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>>;
}

/// [`Querier`] bound to one connection or transaction.
#[derive(Debug)]
pub struct Queries<'c, C> {
    conn: &'c C,
}

impl<'c, C> Queries<'c, C>
where
    C: ConnectionTrait,
{
    /// Binds the query layer to `conn`.
    #[must_use]
    pub const fn new(conn: &'c C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C> Querier for Queries<'_, C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn create_account(&self, params: CreateAccountParams) -> StoreResult<Account> {
        if params.owner.trim().is_empty() {
            return Err(StoreError::invalid("owner must not be empty"));
        }
        if params.currency.trim().is_empty() {
            return Err(StoreError::invalid("currency must not be empty"));
        }

        let account = accounts::ActiveModel {
            owner: Set(params.owner),
            balance: Set(params.balance),
            currency: Set(params.currency),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(account)
    }

    async fn get_account(&self, id: i64) -> StoreResult<Account> {
        accounts::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::not_found("account", id))
    }

    async fn get_account_for_update(&self, id: i64) -> StoreResult<Account> {
        accounts::Entity::find_by_id(id)
            .lock(LockType::NoKeyUpdate)
            .one(self.conn)
            .await?
            .ok_or(StoreError::not_found("account", id))
    }

    async fn list_accounts(&self, params: ListAccountsParams) -> StoreResult<Vec<Account>> {
        let rows = accounts::Entity::find()
            .order_by_asc(accounts::Column::Id)
            .limit(params.limit)
            .offset(params.offset)
            .all(self.conn)
            .await?;
        Ok(rows)
    }

    async fn update_account(&self, params: UpdateAccountParams) -> StoreResult<Account> {
        accounts::Entity::update_many()
            .col_expr(accounts::Column::Balance, Expr::value(params.balance))
            .filter(accounts::Column::Id.eq(params.id))
            .exec_with_returning(self.conn)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::not_found("account", params.id))
    }

    async fn delete_account(&self, id: i64) -> StoreResult<()> {
        let result = accounts::Entity::delete_by_id(id).exec(self.conn).await?;
        if result.rows_affected == 0 {
            return Err(StoreError::not_found("account", id));
        }
        Ok(())
    }

    async fn add_account_balance(
        &self,
        params: AddAccountBalanceParams,
    ) -> StoreResult<Account> {
        // balance = balance + $amount, so concurrent increments never lose updates.
        accounts::Entity::update_many()
            .col_expr(
                accounts::Column::Balance,
                Expr::col(accounts::Column::Balance).add(params.amount),
            )
            .filter(accounts::Column::Id.eq(params.id))
            .exec_with_returning(self.conn)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::not_found("account", params.id))
    }

    async fn create_entry(&self, params: CreateEntryParams) -> StoreResult<Entry> {
        let entry = entries::ActiveModel {
            account_id: Set(params.account_id),
            amount: Set(params.amount),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(entry)
    }

    async fn get_entry(&self, id: i64) -> StoreResult<Entry> {
        entries::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::not_found("entry", id))
    }

    async fn list_entries(&self, params: ListEntriesParams) -> StoreResult<Vec<Entry>> {
        let rows = entries::Entity::find()
            .filter(entries::Column::AccountId.eq(params.account_id))
            .order_by_asc(entries::Column::Id)
            .limit(params.limit)
            .offset(params.offset)
            .all(self.conn)
            .await?;
        Ok(rows)
    }

    async fn create_transfer(&self, params: CreateTransferParams) -> StoreResult<Transfer> {
        if params.amount <= 0 {
            return Err(StoreError::invalid(format!(
                "transfer amount must be positive, got {}",
                params.amount
            )));
        }

        let transfer = transfers::ActiveModel {
            from_account_id: Set(params.from_account_id),
            to_account_id: Set(params.to_account_id),
            amount: Set(params.amount),
            ..Default::default()
        }
        .insert(self.conn)
        .await?;

        Ok(transfer)
    }

    async fn get_transfer(&self, id: i64) -> StoreResult<Transfer> {
        transfers::Entity::find_by_id(id)
            .one(self.conn)
            .await?
            .ok_or(StoreError::not_found("transfer", id))
    }

    async fn list_transfers(&self, params: ListTransfersParams) -> StoreResult<Vec<Transfer>> {
        let rows = transfers::Entity::find()
            .filter(
                Condition::any()
                    .add(transfers::Column::FromAccountId.eq(params.from_account_id))
                    .add(transfers::Column::ToAccountId.eq(params.to_account_id)),
            )
            .order_by_asc(transfers::Column::Id)
            .limit(params.limit)
            .offset(params.offset)
            .all(self.conn)
            .await?;
        Ok(rows)
    }
}
