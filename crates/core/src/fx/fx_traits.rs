use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::{Currency, FxError};

/// External exchange-rate provider.
///
/// Returns the rate that converts one unit of the reference currency into
/// `currency` on `date`, or `None` when no rate exists for that date
/// (non-trading day, provider gap). Callers handle fallback to earlier
/// dates; implementations must not do their own fallback.
#[async_trait]
pub trait RateProviderTrait: Send + Sync {
    async fn rate(
        &self,
        currency: Currency,
        date: NaiveDate,
    ) -> Result<Option<Decimal>, FxError>;
}
