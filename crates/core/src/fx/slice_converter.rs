//! Propagates a reference-currency daily slice into another currency.
//!
//! Absolute fields scale by the exchange rate; percentage and ratio fields
//! are currency-invariant and copied unchanged. Unit counts are not money
//! and are never scaled.

use rust_decimal::Decimal;

use crate::portfolio::performance::{AssetFigures, DailyFigures};

/// Produces the `DailyFigures` slice for a currency from the reference
/// slice and the reference-to-target rate for the same date.
pub fn convert_figures(reference: &DailyFigures, rate: Decimal) -> DailyFigures {
    DailyFigures {
        total_value: reference.total_value * rate,
        total_investment: reference.total_investment * rate,
        total_cash_flow: reference.total_cash_flow * rate,
        raw_daily_change_percentage: reference.raw_daily_change_percentage,
        adjusted_daily_change_percentage: reference.adjusted_daily_change_percentage,
        daily_return: reference.daily_return,
        unrealized_pnl: reference.unrealized_pnl * rate,
        done_profit_and_loss: reference.done_profit_and_loss * rate,
        asset_performance: reference
            .asset_performance
            .iter()
            .map(|(key, entry)| (key.clone(), convert_asset_figures(entry, rate)))
            .collect(),
    }
}

fn convert_asset_figures(reference: &AssetFigures, rate: Decimal) -> AssetFigures {
    AssetFigures {
        units: reference.units,
        total_value: reference.total_value * rate,
        total_investment: reference.total_investment * rate,
        total_cash_flow: reference.total_cash_flow * rate,
        raw_daily_change_percentage: reference.raw_daily_change_percentage,
        adjusted_daily_change_percentage: reference.adjusted_daily_change_percentage,
        unrealized_profit_and_loss: reference.unrealized_profit_and_loss * rate,
        done_profit_and_loss: reference.done_profit_and_loss * rate,
        implied_cash_flow: reference.implied_cash_flow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn reference_slice() -> DailyFigures {
        let mut assets = BTreeMap::new();
        assets.insert(
            "AAPL".to_string(),
            AssetFigures {
                units: dec!(10),
                total_value: dec!(1500),
                total_investment: dec!(1200),
                total_cash_flow: dec!(-200),
                raw_daily_change_percentage: dec!(1.5),
                adjusted_daily_change_percentage: dec!(0.8),
                unrealized_profit_and_loss: dec!(300),
                done_profit_and_loss: dec!(25),
                implied_cash_flow: true,
            },
        );
        DailyFigures {
            total_value: dec!(2000),
            total_investment: dec!(1700),
            total_cash_flow: dec!(-200),
            raw_daily_change_percentage: dec!(1.2),
            adjusted_daily_change_percentage: dec!(0.6),
            daily_return: dec!(0.006),
            unrealized_pnl: dec!(300),
            done_profit_and_loss: dec!(25),
            asset_performance: assets,
        }
    }

    #[test]
    fn test_absolute_fields_scale() {
        let converted = convert_figures(&reference_slice(), dec!(0.9));
        assert_eq!(converted.total_value, dec!(1800.0));
        assert_eq!(converted.total_investment, dec!(1530.0));
        assert_eq!(converted.total_cash_flow, dec!(-180.0));
        assert_eq!(converted.unrealized_pnl, dec!(270.0));
    }

    #[test]
    fn test_ratio_fields_are_invariant() {
        let converted = convert_figures(&reference_slice(), dec!(3.7));
        assert_eq!(converted.raw_daily_change_percentage, dec!(1.2));
        assert_eq!(converted.adjusted_daily_change_percentage, dec!(0.6));
        assert_eq!(converted.daily_return, dec!(0.006));
    }

    #[test]
    fn test_asset_units_and_flags_are_preserved() {
        let converted = convert_figures(&reference_slice(), dec!(0.5));
        let asset = converted.asset_performance.get("AAPL").unwrap();
        assert_eq!(asset.units, dec!(10));
        assert!(asset.implied_cash_flow);
        assert_eq!(asset.total_value, dec!(750.0));
        assert_eq!(asset.adjusted_daily_change_percentage, dec!(0.8));
    }

    #[test]
    fn test_round_trip_with_reciprocal_rate() {
        let reference = reference_slice();
        let rate = dec!(3.6731);
        let there = convert_figures(&reference, rate);
        let back = convert_figures(&there, Decimal::ONE / rate);

        let tolerance = dec!(0.0000001);
        assert!((back.total_value - reference.total_value).abs() < tolerance);
        assert!((back.total_cash_flow - reference.total_cash_flow).abs() < tolerance);
    }
}
