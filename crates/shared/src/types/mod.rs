//! Common types used across the application.

pub mod currency;
pub mod overdraft;
pub mod pagination;

pub use currency::Currency;
pub use overdraft::OverdraftPolicy;
pub use pagination::PageRequest;
