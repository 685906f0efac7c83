use async_trait::async_trait;

use super::{ConsolidatedPeriodRecord, PeriodType};
use crate::errors::Result;

/// Persistence access for consolidated period records.
#[async_trait]
pub trait ConsolidationRepositoryTrait: Send + Sync {
    fn get_period_record(
        &self,
        scope_id: &str,
        period_type: PeriodType,
        period_key: &str,
    ) -> Result<Option<ConsolidatedPeriodRecord>>;

    /// Period records whose key falls in `[start_key, end_key]`, ordered by
    /// key. Period keys are zero-padded, so lexicographic order is
    /// chronological order.
    fn get_period_records_in_range(
        &self,
        scope_id: &str,
        period_type: PeriodType,
        start_key: &str,
        end_key: &str,
    ) -> Result<Vec<ConsolidatedPeriodRecord>>;

    async fn save_period_records(&self, records: &[ConsolidatedPeriodRecord]) -> Result<()>;

    /// Deletes all period records for the scope. Safe: period records are
    /// derived and fully recomputable.
    async fn delete_period_records(&self, scope_id: &str) -> Result<()>;
}
