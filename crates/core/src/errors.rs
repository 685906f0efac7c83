//! Core error types for the performance engine.
//!
//! This module defines storage-agnostic error types. Storage-specific errors
//! (from the persistence crate) are converted to these types by the storage
//! layer before they reach the engine.

use chrono::{NaiveDate, ParseError as ChronoParseError};
use std::num::ParseFloatError;
use thiserror::Error;

use crate::fx::FxError;
use crate::portfolio::verification::VerificationError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the engine.
///
/// Per-date and per-currency failures are isolated at the service layer and
/// logged with scope/date/currency context; only structural failures reach
/// callers through this type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Return calculation failed: {0}")]
    Calculation(#[from] CalculatorError),

    #[error("Fx error: {0}")]
    Fx(#[from] FxError),

    #[error("Verification error: {0}")]
    Verification(#[from] VerificationError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors that occur during return and consolidation calculations.
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    #[error("Snapshot missing for scope {scope_id} on date {date}")]
    MissingSnapshot { scope_id: String, date: NaiveDate },

    #[error("Daily records for scope {scope_id} are not in ascending date order at {date}")]
    OutOfOrderRecords { scope_id: String, date: NaiveDate },

    #[error("Calculation failed: {0}")]
    Calculation(String),
}

/// Validation errors for input data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Failed to parse number: {0}")]
    NumberParse(#[from] ParseFloatError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] ChronoParseError),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<ChronoParseError> for Error {
    fn from(err: ChronoParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
