//! Currency domain models.
//!
//! The tracked currency set is a fixed enumeration. Every per-currency slice
//! of a record is the same typed struct, produced by the same conversion
//! function; there are no dynamic per-currency field maps anywhere in the
//! engine.

use serde::{Deserialize, Serialize};

use super::FxError;

/// Currencies the engine can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Ils,
    Chf,
    Jpy,
}

impl Currency {
    /// Every tracked currency, in canonical order.
    pub const ALL: [Currency; 6] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Ils,
        Currency::Chf,
        Currency::Jpy,
    ];

    /// Returns the ISO 4217 code of this currency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Ils => "ILS",
            Currency::Chf => "CHF",
            Currency::Jpy => "JPY",
        }
    }

    /// Parses an ISO 4217 code, case-insensitively.
    pub fn from_code(code: &str) -> Result<Self, FxError> {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            "ILS" => Ok(Currency::Ils),
            "CHF" => Ok(Currency::Chf),
            "JPY" => Ok(Currency::Jpy),
            other => Err(FxError::UnknownCurrency(other.to_string())),
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Currency configuration for an engine run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    /// Reference (canonical) currency of snapshots and ledger amounts
    pub reference_currency: Currency,
    /// Currencies every record is propagated into
    pub tracked_currencies: Vec<Currency>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reference_currency: Currency::Usd,
            tracked_currencies: Currency::ALL.to_vec(),
        }
    }
}
