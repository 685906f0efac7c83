//! Daily performance domain models.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::CASH_FLOW_TOLERANCE;
use crate::fx::Currency;

/// Per-asset slice of a daily record, in one currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetFigures {
    pub units: Decimal,
    pub total_value: Decimal,
    pub total_investment: Decimal,
    /// Signed: negative = capital added, positive = capital removed
    pub total_cash_flow: Decimal,
    pub raw_daily_change_percentage: Decimal,
    pub adjusted_daily_change_percentage: Decimal,
    pub unrealized_profit_and_loss: Decimal,
    pub done_profit_and_loss: Decimal,
    /// True when the cash flow was inferred from an unexplained unit change
    /// rather than taken from the ledger
    #[serde(default)]
    pub implied_cash_flow: bool,
}

/// Per-currency slice of a daily record.
///
/// Every currency slice is this same typed struct; non-reference slices are
/// produced from the reference slice by `fx::convert_figures`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyFigures {
    pub total_value: Decimal,
    pub total_investment: Decimal,
    /// Signed: negative = capital added, positive = capital removed
    pub total_cash_flow: Decimal,
    pub raw_daily_change_percentage: Decimal,
    pub adjusted_daily_change_percentage: Decimal,
    /// Adjusted daily change as a fraction (adjusted / 100)
    pub daily_return: Decimal,
    pub unrealized_pnl: Decimal,
    pub done_profit_and_loss: Decimal,
    pub asset_performance: BTreeMap<String, AssetFigures>,
}

impl DailyFigures {
    /// Sum of asset-level cash flows in this slice.
    pub fn asset_cash_flow_sum(&self) -> Decimal {
        self.asset_performance
            .values()
            .map(|a| a.total_cash_flow)
            .sum()
    }

    /// Difference between the slice-level cash flow and the asset-level sum,
    /// when it exceeds the tolerance. `None` means the invariant holds.
    pub fn cash_flow_mismatch(&self) -> Option<Decimal> {
        let tolerance = Decimal::from_str(CASH_FLOW_TOLERANCE).expect("valid constant");
        let delta = self.total_cash_flow - self.asset_cash_flow_sum();
        if delta.abs() > tolerance {
            Some(delta)
        } else {
            None
        }
    }
}

/// One entity's performance for one date, across all tracked currencies.
///
/// Created once per (scope, date) when the snapshot is processed; afterwards
/// it is immutable history, mutated only by the corrector and always as a
/// full currency-slice replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyPerformanceRecord {
    pub id: String,
    pub scope_id: String,
    pub date: NaiveDate,
    pub currencies: BTreeMap<Currency, DailyFigures>,
}

impl DailyPerformanceRecord {
    pub fn new(scope_id: &str, date: NaiveDate) -> Self {
        Self {
            id: format!("{}_{}", scope_id, date),
            scope_id: scope_id.to_string(),
            date,
            currencies: BTreeMap::new(),
        }
    }

    pub fn figures(&self, currency: Currency) -> Option<&DailyFigures> {
        self.currencies.get(&currency)
    }

    /// True when every currency slice satisfies the cash-flow invariant.
    pub fn is_consistent(&self) -> bool {
        self.currencies
            .values()
            .all(|f| f.cash_flow_mismatch().is_none())
    }
}
