//! The one daily-return formula.
//!
//! Both the daily pipeline and the consistency verifier call this function;
//! there is no second implementation for "compute" vs "verify" to drift
//! between.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DECIMAL_PRECISION;

/// Raw and cash-flow-adjusted daily percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChange {
    pub raw: Decimal,
    pub adjusted: Decimal,
}

impl DailyChange {
    pub const ZERO: DailyChange = DailyChange {
        raw: Decimal::ZERO,
        adjusted: Decimal::ZERO,
    };

    /// Adjusted change as a fraction (adjusted / 100).
    pub fn daily_return(&self) -> Decimal {
        self.adjusted / Decimal::ONE_HUNDRED
    }
}

/// Computes raw and adjusted daily change for an entity.
///
/// `cash_flow` sign convention: negative = capital added (deposit/buy),
/// positive = capital removed (withdrawal/sell proceeds). The flow is added
/// to the value delta, cancelling the value change it produced.
///
/// A previous value of zero or less means there is no baseline (new
/// position); both percentages are zero, which chains as a neutral day.
pub fn compute_daily_change(
    previous_value: Decimal,
    current_value: Decimal,
    cash_flow: Decimal,
) -> DailyChange {
    if previous_value <= Decimal::ZERO {
        return DailyChange::ZERO;
    }

    let raw = (current_value - previous_value) / previous_value * Decimal::ONE_HUNDRED;
    let adjusted =
        (current_value - previous_value + cash_flow) / previous_value * Decimal::ONE_HUNDRED;

    DailyChange {
        raw: raw.round_dp(DECIMAL_PRECISION),
        adjusted: adjusted.round_dp(DECIMAL_PRECISION),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_gain_without_flow() {
        // previous 1000, current 1050, no flow -> raw = adjusted = 5.0%
        let change = compute_daily_change(dec!(1000), dec!(1050), Decimal::ZERO);
        assert_eq!(change.raw, dec!(5.0));
        assert_eq!(change.adjusted, dec!(5.0));
    }

    #[test]
    fn test_deposit_is_not_performance() {
        // previous 1000, current 1100, deposit of 100 -> adjusted 0.0%
        let change = compute_daily_change(dec!(1000), dec!(1100), dec!(-100));
        assert_eq!(change.raw, dec!(10.0));
        assert_eq!(change.adjusted, dec!(0.0));
    }

    #[test]
    fn test_withdrawal_is_not_loss() {
        // previous 1000, current 900, withdrawal of 100 -> adjusted 0.0%
        let change = compute_daily_change(dec!(1000), dec!(900), dec!(100));
        assert_eq!(change.raw, dec!(-10.0));
        assert_eq!(change.adjusted, dec!(0.0));
    }

    #[test]
    fn test_no_baseline_yields_zero() {
        let change = compute_daily_change(Decimal::ZERO, dec!(500), Decimal::ZERO);
        assert_eq!(change, DailyChange::ZERO);

        let change = compute_daily_change(dec!(-10), dec!(500), dec!(-500));
        assert_eq!(change, DailyChange::ZERO);
    }

    #[test]
    fn test_zero_flow_identity() {
        for (prev, curr) in [
            (dec!(1000), dec!(1013.37)),
            (dec!(250.5), dec!(249.9)),
            (dec!(7), dec!(7)),
        ] {
            let change = compute_daily_change(prev, curr, Decimal::ZERO);
            assert_eq!(change.raw, change.adjusted);
        }
    }

    #[test]
    fn test_daily_return_fraction() {
        let change = compute_daily_change(dec!(1000), dec!(1050), Decimal::ZERO);
        assert_eq!(change.daily_return(), dec!(0.05));
    }
}
