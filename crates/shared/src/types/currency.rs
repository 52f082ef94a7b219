//! Currency codes accepted at the service boundary.
//!
//! The storage layer keeps currency as free text; this type is what the
//! HTTP surface and fixtures use to stay inside the supported set.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency codes supported by the bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// US Dollar
    Usd,
    /// Euro
    Eur,
    /// Canadian Dollar
    Cad,
}

impl Currency {
    /// Every supported currency, in display order.
    pub const ALL: [Self; 3] = [Self::Usd, Self::Eur, Self::Cad];

    /// Returns the ISO code as stored in the `currency` column.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Cad => "CAD",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "CAD" => Ok(Self::Cad),
            _ => Err(format!("Unknown currency: {s}")),
        }
    }
}
