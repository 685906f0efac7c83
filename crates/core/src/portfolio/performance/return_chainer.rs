//! Return chaining: time-weighted factors and modified-Dietz returns.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::constants::DECIMAL_PRECISION;

/// Running time-weighted return factor.
///
/// Each adjusted daily change compounds multiplicatively; a zero-adjusted
/// day (including day-one "no baseline" days) is neutral, never skipped.
/// The chain can be seeded from a stored checkpoint, which is what lets
/// period consolidation resume mid-sequence without touching history.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwrChain {
    factor: Decimal,
}

impl TwrChain {
    /// A fresh chain starting at factor 1.
    pub fn new() -> Self {
        Self {
            factor: Decimal::ONE,
        }
    }

    /// Resumes a chain from a stored factor checkpoint.
    pub fn seeded(start_factor: Decimal) -> Self {
        Self {
            factor: start_factor,
        }
    }

    /// Compounds one day's adjusted percentage change into the factor.
    pub fn push(&mut self, adjusted_pct: Decimal) {
        self.factor *= Decimal::ONE + adjusted_pct / Decimal::ONE_HUNDRED;
    }

    /// Compounds an already-chained sub-period, given its start and end
    /// factors. Used when rolling months into a year.
    pub fn push_factor_span(&mut self, start_factor: Decimal, end_factor: Decimal) {
        if start_factor.is_zero() {
            return;
        }
        self.factor *= end_factor / start_factor;
    }

    pub fn factor(&self) -> Decimal {
        self.factor
    }

    /// The chained return as a percentage: `(factor − 1) × 100`.
    pub fn period_return_pct(&self) -> Decimal {
        ((self.factor - Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION)
    }
}

impl Default for TwrChain {
    fn default() -> Self {
        Self::new()
    }
}

/// Modified-Dietz money-weighted return over a period, as a percentage.
///
/// `total_cash_flow` uses the engine-wide sign convention (negative =
/// capital added), so net deposits are its negation. Flows are assumed to
/// land mid-period (half weighting). Returns `None` when no investment
/// base is usable - an undefined MWR is reported as absent, never as zero.
pub fn modified_dietz(
    start_value: Decimal,
    end_value: Decimal,
    total_cash_flow: Decimal,
) -> Option<Decimal> {
    let net_deposits = -total_cash_flow;
    let investment_base = start_value + net_deposits / dec!(2);
    let gain = end_value - start_value - net_deposits;

    if investment_base > Decimal::ZERO {
        return Some((gain / investment_base * Decimal::ONE_HUNDRED).round_dp(DECIMAL_PRECISION));
    }

    // Position opened from zero during the period: measure against the
    // deposits themselves.
    if net_deposits > Decimal::ZERO {
        return Some(
            ((end_value - net_deposits) / net_deposits * Decimal::ONE_HUNDRED)
                .round_dp(DECIMAL_PRECISION),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_day_chain() {
        // 1.0%, 2.0%, -0.5% -> 1.01 * 1.02 * 0.995 = 1.025449
        let mut chain = TwrChain::new();
        chain.push(dec!(1.0));
        chain.push(dec!(2.0));
        chain.push(dec!(-0.5));

        assert_eq!(chain.factor(), dec!(1.0250490));
        assert_eq!(chain.period_return_pct(), dec!(2.504900));
    }

    #[test]
    fn test_zero_days_are_neutral() {
        let mut chain = TwrChain::new();
        chain.push(Decimal::ZERO);
        chain.push(dec!(3.0));
        chain.push(Decimal::ZERO);

        assert_eq!(chain.factor(), dec!(1.030));
    }

    #[test]
    fn test_seeded_chain_resumes() {
        let mut full = TwrChain::new();
        for pct in [dec!(1.0), dec!(2.0), dec!(-0.5), dec!(0.25)] {
            full.push(pct);
        }

        let mut head = TwrChain::new();
        head.push(dec!(1.0));
        head.push(dec!(2.0));

        let mut tail = TwrChain::seeded(head.factor());
        tail.push(dec!(-0.5));
        tail.push(dec!(0.25));

        assert_eq!(tail.factor(), full.factor());
    }

    #[test]
    fn test_factor_span_composition() {
        let mut chain = TwrChain::new();
        // Month factors 1.0 -> 1.02, then 1.02 -> 1.071
        chain.push_factor_span(Decimal::ONE, dec!(1.02));
        chain.push_factor_span(dec!(1.02), dec!(1.071));
        assert_eq!(chain.factor(), dec!(1.071));
    }

    #[test]
    fn test_factor_span_zero_start_is_ignored() {
        let mut chain = TwrChain::new();
        chain.push_factor_span(Decimal::ZERO, dec!(1.05));
        assert_eq!(chain.factor(), Decimal::ONE);
    }

    #[test]
    fn test_dietz_plain_gain() {
        // 1000 -> 1100 with no flows: 10%
        assert_eq!(
            modified_dietz(dec!(1000), dec!(1100), Decimal::ZERO),
            Some(dec!(10))
        );
    }

    #[test]
    fn test_dietz_half_weights_deposits() {
        // 1000 -> 1150 with a 100 deposit: gain 50 over base 1050
        let mwr = modified_dietz(dec!(1000), dec!(1150), dec!(-100)).unwrap();
        assert_eq!(mwr, dec!(4.761905));
    }

    #[test]
    fn test_dietz_opened_from_zero() {
        // No start value, 1000 deposited, worth 1080 at period end
        let mwr = modified_dietz(Decimal::ZERO, dec!(1080), dec!(-1000)).unwrap();
        assert_eq!(mwr, dec!(8));
    }

    #[test]
    fn test_dietz_undefined_is_none() {
        // No start value and nothing deposited: no base to measure against
        assert_eq!(modified_dietz(Decimal::ZERO, dec!(50), dec!(100)), None);
    }
}
