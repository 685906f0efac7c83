//! Period statistics over daily return sequences.

use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::DECIMAL_PRECISION;

const TRADING_DAYS_PER_YEAR: u32 = 252;
const DAYS_PER_YEAR_DECIMAL: Decimal = dec!(365.25);
const SQRT_TRADING_DAYS_APPROX: Decimal = dec!(15.874507866); // sqrt(252)

/// Descriptive statistics for a period, all as fractions (0.05 = 5%).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStatistics {
    pub annualized_return: Decimal,
    pub volatility: Decimal,
    pub max_drawdown: Decimal,
}

/// Annualizes a cumulative return over the given date span.
///
/// Spans under one year are returned as-is; a total loss caps at -100%.
pub fn annualized_return(
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_return: Decimal,
) -> Decimal {
    if start_date > end_date {
        return Decimal::ZERO;
    }

    if total_return <= dec!(-1.0) {
        return dec!(-1.0);
    }

    let days = (end_date - start_date).num_days();
    if days <= 0 {
        return total_return;
    }

    let years = Decimal::from(days) / DAYS_PER_YEAR_DECIMAL;
    if years < Decimal::ONE {
        return total_return;
    }

    let base = Decimal::ONE + total_return;
    if base <= Decimal::ZERO {
        return dec!(-1.0);
    }

    let exponent = Decimal::ONE / years;
    (base.powd(exponent) - Decimal::ONE).round_dp(DECIMAL_PRECISION)
}

/// Annualized sample standard deviation of daily returns.
pub fn volatility(daily_returns: &[Decimal]) -> Decimal {
    if daily_returns.len() < 2 {
        return Decimal::ZERO;
    }

    let count = Decimal::from(daily_returns.len());
    let sum: Decimal = daily_returns.iter().sum();
    let mean = sum / count;

    let sum_squared_diff: Decimal = daily_returns
        .iter()
        .map(|&r| {
            let diff = r - mean;
            diff * diff
        })
        .sum();

    let variance = sum_squared_diff / (count - Decimal::ONE);
    if variance.is_sign_negative() {
        return Decimal::ZERO;
    }

    let daily_volatility = variance.sqrt().unwrap_or(Decimal::ZERO);
    let annualization_factor = Decimal::from(TRADING_DAYS_PER_YEAR)
        .sqrt()
        .unwrap_or(SQRT_TRADING_DAYS_APPROX);

    (daily_volatility * annualization_factor).round_dp(DECIMAL_PRECISION)
}

/// Largest peak-to-trough loss along the compounded return path.
pub fn max_drawdown(daily_returns: &[Decimal]) -> Decimal {
    if daily_returns.is_empty() {
        return Decimal::ZERO;
    }

    let mut cumulative_value = Decimal::ONE;
    let mut peak_value = Decimal::ONE;
    let mut worst = Decimal::ZERO;

    for &daily_return in daily_returns {
        cumulative_value *= Decimal::ONE + daily_return;
        peak_value = peak_value.max(cumulative_value);
        if peak_value.is_zero() {
            worst = worst.max(Decimal::ONE);
        } else {
            let drawdown = (peak_value - cumulative_value) / peak_value;
            worst = worst.max(drawdown);
        }
    }

    worst.max(Decimal::ZERO).round_dp(DECIMAL_PRECISION)
}
