use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by exchange-rate lookup and currency propagation.
#[derive(Error, Debug)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Rate lookup for {currency} on {date} exhausted after {attempts} attempts")]
    LookupExhausted {
        currency: String,
        date: NaiveDate,
        attempts: u32,
    },

    #[error("Rate {rate} for {currency} on {date} is outside the plausible band")]
    ImplausibleRate {
        currency: String,
        date: NaiveDate,
        rate: Decimal,
    },

    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Rate provider error: {0}")]
    Provider(String),
}
