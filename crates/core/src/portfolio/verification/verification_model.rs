//! Verification domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fx::Currency;

/// Whether a verification run persists its corrections.
///
/// The mode is a single flag checked at the write path; verify and fix run
/// the same computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationMode {
    /// Report proposed corrections without persisting
    DryRun,
    /// Persist corrections and report counts
    Fix,
}

/// Thresholds and batching for verification runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationConfig {
    /// Percentage-point tolerance for field-level adjusted-return checks
    pub field_tolerance_pp: Decimal,
    /// Percentage-point tolerance for cross-level (account vs overall) checks
    pub cross_scope_tolerance_pp: Decimal,
    /// Records per correction batch; each batch is applied atomically
    pub batch_size: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            field_tolerance_pp: dec!(0.01),
            cross_scope_tolerance_pp: dec!(0.5),
            batch_size: 200,
        }
    }
}

/// Which stored field diverged from its recomputed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscrepancyField {
    /// Stored adjusted return disagrees with the recomputed one
    AdjustedReturn,
    /// Record-level cash flow disagrees with the sum of asset flows
    CashFlowTotal,
    /// Overall record disagrees with the sum of its account records
    CrossScopeAdjusted,
}

/// One detected divergence between stored and recomputed values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    pub scope_id: String,
    pub date: NaiveDate,
    pub currency: Currency,
    pub field: DiscrepancyField,
    pub stored: Decimal,
    pub expected: Decimal,
}

impl Discrepancy {
    pub fn delta(&self) -> Decimal {
        (self.stored - self.expected).abs()
    }
}

/// Outcome of a verification run over one or more scopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub mode: VerificationMode,
    /// Records examined
    pub scanned: u32,
    /// Records with at least one discrepancy
    pub flagged: u32,
    /// Records rewritten (fix mode only; zero in dry-run)
    pub corrected: u32,
    /// Records examined and left untouched
    pub unchanged: u32,
    /// Correction batches applied
    pub batches_applied: u32,
    pub discrepancies: Vec<Discrepancy>,
}

impl VerificationReport {
    pub fn new(mode: VerificationMode) -> Self {
        Self {
            mode,
            scanned: 0,
            flagged: 0,
            corrected: 0,
            unchanged: 0,
            batches_applied: 0,
            discrepancies: Vec::new(),
        }
    }
}

/// Errors raised while verifying or correcting records.
#[derive(Error, Debug)]
pub enum VerificationError {
    /// A record under correction is structurally unusable. Aborts the
    /// current batch; previously applied batches remain valid.
    #[error("Malformed record {record_id}: {detail}")]
    MalformedRecord { record_id: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let config = VerificationConfig::default();
        assert_eq!(config.field_tolerance_pp, dec!(0.01));
        assert_eq!(config.cross_scope_tolerance_pp, dec!(0.5));
        assert_eq!(config.batch_size, 200);
    }

    #[test]
    fn test_discrepancy_delta_is_absolute() {
        let discrepancy = Discrepancy {
            scope_id: "acc-1".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 2).unwrap(),
            currency: Currency::Usd,
            field: DiscrepancyField::AdjustedReturn,
            stored: dec!(-3.0),
            expected: dec!(1.5),
        };
        assert_eq!(discrepancy.delta(), dec!(4.5));
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(
            serde_json::to_string(&VerificationMode::DryRun).unwrap(),
            "\"DRY_RUN\""
        );
    }
}
