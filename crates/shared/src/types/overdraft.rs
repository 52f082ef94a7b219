//! Overdraft policy for transfers.

use serde::{Deserialize, Serialize};

/// Whether a transfer may leave its source account below zero.
///
/// Only the transfer workflow consults this; the raw balance primitives
/// stay unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverdraftPolicy {
    /// Abort the transfer if the source balance would go negative.
    #[default]
    Reject,
    /// Let the source balance go negative.
    Allow,
}

impl OverdraftPolicy {
    /// Returns true if `balance` is acceptable as a post-transfer source balance.
    #[must_use]
    pub const fn permits(self, balance: i64) -> bool {
        match self {
            Self::Reject => balance >= 0,
            Self::Allow => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rejects_negative_balances() {
        let policy = OverdraftPolicy::default();
        assert_eq!(policy, OverdraftPolicy::Reject);
        assert!(policy.permits(0));
        assert!(policy.permits(10));
        assert!(!policy.permits(-1));
    }

    #[test]
    fn test_allow_permits_anything() {
        assert!(OverdraftPolicy::Allow.permits(i64::MIN));
    }

    #[test]
    fn test_deserializes_lowercase() {
        let policy: OverdraftPolicy = serde_json::from_str("\"allow\"").unwrap();
        assert_eq!(policy, OverdraftPolicy::Allow);
    }
}
