//! Pagination parameters for list endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Page request as accepted by `GET /accounts`.
///
/// `page_id` is 1-indexed; `page_size` is bounded to keep list queries cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[validate(range(min = 1))]
    pub page_id: u32,
    /// Number of items per page.
    #[validate(range(min = 5, max = 10))]
    pub page_size: u32,
}

impl PageRequest {
    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page_id.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}
