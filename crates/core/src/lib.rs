//! Ledger rules for BubbleBank.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Transfer validation, lock ordering and the overdraft check live here so the
//! storage layer only has to sequence them inside a transaction.

pub mod ledger;
