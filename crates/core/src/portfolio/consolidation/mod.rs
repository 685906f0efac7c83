//! Consolidation module - monthly/yearly rollup of daily records.

mod consolidation_model;
mod consolidation_service;
mod consolidation_traits;
pub mod period_stats;

pub use consolidation_model::{ConsolidatedPeriodRecord, PeriodFigures, PeriodType};
pub use consolidation_service::{ConsolidationService, ConsolidationServiceTrait};
pub use consolidation_traits::ConsolidationRepositoryTrait;
pub use period_stats::PeriodStatistics;
