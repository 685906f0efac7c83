//! Dated exchange-rate lookup with bounded fallback to earlier days.
//!
//! A missing rate on a given date usually means a non-trading day; the
//! lookup walks back one day at a time until a rate is found or the
//! attempts run out. Exhaustion is reported, never silently zeroed.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::fx_traits::RateProviderTrait;
use super::{Currency, FxError};

/// Tuning for dated rate lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLookupConfig {
    /// Dates probed per lookup (the requested date plus earlier days)
    pub max_attempts: u32,
    /// Pause between attempts, keeping pressure off the provider
    pub retry_delay: Duration,
    /// Lower bound of the plausible rate band
    pub min_rate: Decimal,
    /// Upper bound of the plausible rate band
    pub max_rate: Decimal,
}

impl Default for RateLookupConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_millis(50),
            min_rate: dec!(0.0001),
            max_rate: dec!(10000),
        }
    }
}

/// Rate lookup over an external provider.
#[derive(Clone)]
pub struct RateLookup {
    provider: Arc<dyn RateProviderTrait>,
    config: RateLookupConfig,
}

impl RateLookup {
    pub fn new(provider: Arc<dyn RateProviderTrait>) -> Self {
        Self {
            provider,
            config: RateLookupConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RateLookupConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolves the reference-to-`currency` rate for `date`.
    ///
    /// Probes `date` first, then progressively earlier dates, sleeping
    /// `retry_delay` between attempts. A rate outside the plausible band is
    /// rejected as corrupt rather than applied.
    pub async fn rate_for_date(
        &self,
        currency: Currency,
        date: NaiveDate,
    ) -> Result<Decimal, FxError> {
        let mut probe_date = date;

        for attempt in 0..self.config.max_attempts {
            if attempt > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }

            match self.provider.rate(currency, probe_date).await? {
                Some(rate) => {
                    self.check_plausible(currency, probe_date, rate)?;
                    if probe_date != date {
                        debug!(
                            "Rate for {} on {} filled from prior trading day {}",
                            currency, date, probe_date
                        );
                    }
                    return Ok(rate);
                }
                None => {
                    probe_date = match probe_date.pred_opt() {
                        Some(prev) => prev,
                        None => break,
                    };
                }
            }
        }

        warn!(
            "Rate lookup exhausted for {} on {} after {} attempts",
            currency, date, self.config.max_attempts
        );
        Err(FxError::LookupExhausted {
            currency: currency.as_str().to_string(),
            date,
            attempts: self.config.max_attempts,
        })
    }

    /// Rejects rates outside the plausible band. Catches upstream corruption
    /// such as every currency reporting the same value as the reference.
    fn check_plausible(
        &self,
        currency: Currency,
        date: NaiveDate,
        rate: Decimal,
    ) -> Result<(), FxError> {
        if rate <= Decimal::ZERO || rate < self.config.min_rate || rate > self.config.max_rate {
            warn!(
                "Rejecting implausible rate {} for {} on {}",
                rate, currency, date
            );
            return Err(FxError::ImplausibleRate {
                currency: currency.as_str().to_string(),
                date,
                rate,
            });
        }
        Ok(())
    }
}
