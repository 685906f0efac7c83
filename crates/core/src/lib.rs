//! Perfolio Core - performance and return consolidation engine.
//!
//! This crate computes cash-flow-adjusted daily returns per entity, chains
//! them into time-weighted and modified-Dietz returns, propagates values
//! across currencies, and rolls daily records up into monthly and yearly
//! periods while detecting and repairing inconsistencies. It is
//! storage-agnostic and defines traits that are implemented by the
//! persistence crate.

pub mod constants;
pub mod errors;
pub mod events;
pub mod fx;
pub mod ledger;
pub mod portfolio;
pub mod utils;

// Re-export common types from the portfolio modules
pub use portfolio::consolidation::*;
pub use portfolio::performance::*;
pub use portfolio::snapshot::*;
pub use portfolio::verification::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
