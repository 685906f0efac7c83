use async_trait::async_trait;
use chrono::NaiveDate;

use super::DailyPerformanceRecord;
use crate::errors::Result;

/// Persistence access for daily performance records.
///
/// Implemented by the storage crate. Reads return records in ascending date
/// order; the engine depends on that ordering for return chaining.
#[async_trait]
pub trait PerformanceRepositoryTrait: Send + Sync {
    /// Daily records for the scope, optionally bounded (inclusive).
    fn get_daily_records(
        &self,
        scope_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DailyPerformanceRecord>>;

    /// The most recent stored record for the scope, if any.
    fn get_latest_record(&self, scope_id: &str) -> Result<Option<DailyPerformanceRecord>>;

    /// Persists newly calculated records.
    async fn save_records(&self, records: &[DailyPerformanceRecord]) -> Result<()>;

    /// Replaces existing records in one transaction: all records in the
    /// batch are written or none are. Used only by the corrector.
    async fn replace_records(&self, records: &[DailyPerformanceRecord]) -> Result<()>;

    /// Deletes all records for the scope (full recalculation).
    async fn delete_records(&self, scope_id: &str) -> Result<()>;
}
