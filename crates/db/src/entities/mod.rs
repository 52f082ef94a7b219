//! `SeaORM` entity definitions for the ledger tables.

pub mod accounts;
pub mod entries;
pub mod transfers;

/// A row of `accounts`.
pub type Account = accounts::Model;
/// A row of `entries`.
pub type Entry = entries::Model;
/// A row of `transfers`.
pub type Transfer = transfers::Model;
