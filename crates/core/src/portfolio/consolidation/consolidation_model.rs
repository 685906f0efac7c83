//! Consolidated period domain models.
//!
//! Period records are derived caches over daily records: fully recomputable,
//! safe to delete and regenerate at any time. They cache truth, they never
//! originate it.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::fx::Currency;

/// Granularity of a consolidated period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodType {
    Month,
    Year,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Month => "MONTH",
            PeriodType::Year => "YEAR",
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-currency slice of a consolidated period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodFigures {
    pub start_total_value: Decimal,
    pub end_total_value: Decimal,
    /// Chained TWR factor at period start (checkpoint from the prior period)
    pub start_factor: Decimal,
    /// Chained TWR factor at period end:
    /// `start_factor × Π(1 + daily_adjusted/100)` over the period
    pub end_factor: Decimal,
    /// Time-weighted period return, percent
    pub period_return: Decimal,
    /// Money-weighted (modified Dietz) return, percent.
    /// `None` when undefined - absence is not zero performance.
    pub personal_return: Option<Decimal>,
    /// Signed sum of daily cash flows over the period
    pub total_cash_flow: Decimal,
    /// Daily records found in the period
    pub docs_count: u32,
    /// Daily records that carried this currency's slice
    pub valid_docs_count: u32,
}

/// One entity's consolidated performance over one period.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedPeriodRecord {
    pub id: String,
    pub scope_id: String,
    pub period_type: PeriodType,
    /// "YYYY-MM" for months, "YYYY" for years
    pub period_key: String,
    /// Bumped every regeneration
    pub version: u32,
    pub currencies: BTreeMap<Currency, PeriodFigures>,
}

impl ConsolidatedPeriodRecord {
    pub fn new(scope_id: &str, period_type: PeriodType, period_key: &str, version: u32) -> Self {
        Self {
            id: format!("{}_{}_{}", scope_id, period_type.as_str(), period_key),
            scope_id: scope_id.to_string(),
            period_type,
            period_key: period_key.to_string(),
            version,
            currencies: BTreeMap::new(),
        }
    }

    pub fn figures(&self, currency: Currency) -> Option<&PeriodFigures> {
        self.currencies.get(&currency)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_format() {
        let record = ConsolidatedPeriodRecord::new("TOTAL", PeriodType::Month, "2024-03", 1);
        assert_eq!(record.id, "TOTAL_MONTH_2024-03");
    }

    #[test]
    fn test_period_type_serialization() {
        assert_eq!(serde_json::to_string(&PeriodType::Year).unwrap(), "\"YEAR\"");
        assert_eq!(
            serde_json::from_str::<PeriodType>("\"MONTH\"").unwrap(),
            PeriodType::Month
        );
    }
}
