//! Domain event types.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::portfolio::consolidation::PeriodType;

/// Domain events emitted by engine services after successful mutations.
///
/// These events represent facts about record changes. Runtime adapters
/// translate them into platform-specific actions, most importantly the
/// invalidation of cached report aggregates after a correction pass.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// Daily performance records were rewritten by the corrector.
    /// Downstream caches derived from these records must be invalidated.
    DailyRecordsCorrected {
        scope_ids: Vec<String>,
        first_date: Option<NaiveDate>,
        last_date: Option<NaiveDate>,
        record_count: u32,
    },

    /// Consolidated period records were created or regenerated.
    PeriodsConsolidated {
        scope_id: String,
        period_type: PeriodType,
        period_keys: Vec<String>,
    },
}

impl DomainEvent {
    /// Creates a DailyRecordsCorrected event.
    pub fn daily_records_corrected(
        scope_ids: Vec<String>,
        first_date: Option<NaiveDate>,
        last_date: Option<NaiveDate>,
        record_count: u32,
    ) -> Self {
        Self::DailyRecordsCorrected {
            scope_ids,
            first_date,
            last_date,
            record_count,
        }
    }

    /// Creates a PeriodsConsolidated event.
    pub fn periods_consolidated(
        scope_id: String,
        period_type: PeriodType,
        period_keys: Vec<String>,
    ) -> Self {
        Self::PeriodsConsolidated {
            scope_id,
            period_type,
            period_keys,
        }
    }
}
