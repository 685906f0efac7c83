//! End-of-day snapshot domain models.
//!
//! Snapshots are the engine's market-value input: one per scope per date,
//! valued in the reference currency by an upstream valuation pass.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One asset's end-of-day state within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetSnapshot {
    pub units: Decimal,
    /// Market value in the reference currency
    pub value: Decimal,
    /// Invested capital (cost basis) in the reference currency
    pub investment: Decimal,
}

/// The end-of-day state of one scope (account or the whole portfolio).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailySnapshot {
    pub scope_id: String,
    pub date: NaiveDate,
    pub total_value: Decimal,
    pub total_investment: Decimal,
    pub assets: BTreeMap<String, AssetSnapshot>,
}

impl DailySnapshot {
    pub fn new(scope_id: &str, date: NaiveDate) -> Self {
        Self {
            scope_id: scope_id.to_string(),
            date,
            total_value: Decimal::ZERO,
            total_investment: Decimal::ZERO,
            assets: BTreeMap::new(),
        }
    }
}
