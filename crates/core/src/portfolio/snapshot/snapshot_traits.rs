use chrono::NaiveDate;

use super::DailySnapshot;
use crate::errors::Result;

/// Read access to persisted end-of-day snapshots.
///
/// Implemented by the storage crate. Snapshots are returned in ascending
/// date order; the engine relies on that ordering for return chaining.
pub trait SnapshotRepositoryTrait: Send + Sync {
    /// Snapshots for the scope, optionally bounded (inclusive).
    fn get_daily_snapshots(
        &self,
        scope_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<DailySnapshot>>;
}
