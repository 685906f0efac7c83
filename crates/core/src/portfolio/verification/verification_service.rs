//! Consistency verification and correction.
//!
//! An independent pass over already-persisted daily records. For every date
//! after the first, the expected adjusted return is recomputed from stored
//! values and the sum of stored asset-level cash flows - through the same
//! pure function the pipeline used - and compared against what is stored.
//! Divergent records are rewritten as whole currency slices in size-bounded
//! atomic batches. The pass is idempotent: once nothing diverges, re-running
//! changes nothing.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::verification_model::{
    Discrepancy, DiscrepancyField, VerificationConfig, VerificationError, VerificationMode,
    VerificationReport,
};
use crate::constants::{CASH_FLOW_TOLERANCE, PORTFOLIO_TOTAL_SCOPE_ID};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::fx::EngineConfig;
use crate::portfolio::performance::{
    compute_daily_change, AssetFigures, DailyFigures, DailyPerformanceRecord,
    PerformanceRepositoryTrait,
};

#[async_trait]
pub trait VerificationServiceTrait: Send + Sync {
    /// Verifies one scope's daily records in date order, correcting (or in
    /// dry-run mode, proposing) full-slice rewrites where stored returns or
    /// cash flows diverge from their recomputed values.
    async fn verify_scope(
        &self,
        scope_id: &str,
        mode: VerificationMode,
    ) -> Result<VerificationReport>;

    /// Verifies the overall record against the direct sum of account-level
    /// cash flows, at the looser cross-scope tolerance.
    async fn verify_overall_against_accounts(
        &self,
        account_scope_ids: &[String],
        mode: VerificationMode,
    ) -> Result<VerificationReport>;
}

#[derive(Clone)]
pub struct VerificationService {
    engine_config: EngineConfig,
    config: VerificationConfig,
    performance_repository: Arc<dyn PerformanceRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl VerificationService {
    pub fn new(
        engine_config: EngineConfig,
        config: VerificationConfig,
        performance_repository: Arc<dyn PerformanceRepositoryTrait>,
    ) -> Self {
        Self {
            engine_config,
            config,
            performance_repository,
            event_sink: Arc::new(NoOpDomainEventSink),
        }
    }

    /// Sets the domain event sink for this service.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    fn cash_flow_tolerance() -> Decimal {
        Decimal::from_str(CASH_FLOW_TOLERANCE).expect("valid constant")
    }

    /// Structural validation of a record about to be verified. A failure
    /// here aborts the current batch and surfaces - no partial writes.
    fn check_well_formed(&self, record: &DailyPerformanceRecord) -> Result<()> {
        if record
            .figures(self.engine_config.reference_currency)
            .is_none()
        {
            return Err(VerificationError::MalformedRecord {
                record_id: record.id.clone(),
                detail: format!(
                    "missing reference currency slice {}",
                    self.engine_config.reference_currency
                ),
            }
            .into());
        }
        for (currency, figures) in &record.currencies {
            for (asset_key, entry) in &figures.asset_performance {
                if entry.units.is_sign_negative() {
                    return Err(VerificationError::MalformedRecord {
                        record_id: record.id.clone(),
                        detail: format!(
                            "negative units for asset {} in {} slice",
                            asset_key, currency
                        ),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Recomputes one record against its predecessor. Returns the fully
    /// rebuilt record plus the discrepancies that justify replacing it.
    fn recompute_record(
        &self,
        record: &DailyPerformanceRecord,
        previous: Option<&DailyPerformanceRecord>,
    ) -> (DailyPerformanceRecord, Vec<Discrepancy>) {
        let mut corrected = record.clone();
        let mut discrepancies = Vec::new();

        for (&currency, figures) in &record.currencies {
            let previous_figures = previous.and_then(|p| p.figures(currency));
            let canonical_flow = figures.asset_cash_flow_sum();

            if (figures.total_cash_flow - canonical_flow).abs() > Self::cash_flow_tolerance() {
                discrepancies.push(Discrepancy {
                    scope_id: record.scope_id.clone(),
                    date: record.date,
                    currency,
                    field: DiscrepancyField::CashFlowTotal,
                    stored: figures.total_cash_flow,
                    expected: canonical_flow,
                });
            }

            // The adjusted-return check only applies from the second date
            // on; day one has no baseline by definition.
            if let Some(prev) = previous_figures {
                let expected =
                    compute_daily_change(prev.total_value, figures.total_value, canonical_flow);
                let delta = (expected.adjusted - figures.adjusted_daily_change_percentage).abs();
                if delta > self.config.field_tolerance_pp {
                    discrepancies.push(Discrepancy {
                        scope_id: record.scope_id.clone(),
                        date: record.date,
                        currency,
                        field: DiscrepancyField::AdjustedReturn,
                        stored: figures.adjusted_daily_change_percentage,
                        expected: expected.adjusted,
                    });
                }
            } else if previous.is_some() {
                debug!(
                    "No previous {} slice for scope '{}' on {}; adjusted check skipped",
                    currency, record.scope_id, record.date
                );
            }

            corrected.currencies.insert(
                currency,
                rebuild_slice(figures, previous_figures, canonical_flow),
            );
        }

        (corrected, discrepancies)
    }

    async fn flush_batch(
        &self,
        pending: &mut Vec<DailyPerformanceRecord>,
        mode: VerificationMode,
        report: &mut VerificationReport,
    ) -> Result<()> {
        if pending.is_empty() {
            return Ok(());
        }
        if mode == VerificationMode::Fix {
            let batch_id = Uuid::new_v4();
            self.performance_repository
                .replace_records(pending)
                .await?;
            report.corrected += pending.len() as u32;
            report.batches_applied += 1;
            debug!(
                "Applied correction batch {} ({} records)",
                batch_id,
                pending.len()
            );
        }
        pending.clear();
        Ok(())
    }

    fn emit_corrections(&self, scope_ids: Vec<String>, dates: &[NaiveDate], count: u32) {
        if count == 0 {
            return;
        }
        self.event_sink.emit(DomainEvent::daily_records_corrected(
            scope_ids,
            dates.first().copied(),
            dates.last().copied(),
            count,
        ));
    }
}

/// Builds the replacement currency slice from stored values and canonical
/// flows. Always a whole new slice, never a partial field update.
fn rebuild_slice(
    figures: &DailyFigures,
    previous: Option<&DailyFigures>,
    canonical_flow: Decimal,
) -> DailyFigures {
    let mut asset_performance: BTreeMap<String, AssetFigures> = BTreeMap::new();
    for (asset_key, entry) in &figures.asset_performance {
        let previous_value = previous
            .and_then(|p| p.asset_performance.get(asset_key))
            .map(|p| p.total_value)
            .unwrap_or(Decimal::ZERO);
        let change = compute_daily_change(previous_value, entry.total_value, entry.total_cash_flow);
        asset_performance.insert(
            asset_key.clone(),
            AssetFigures {
                raw_daily_change_percentage: change.raw,
                adjusted_daily_change_percentage: change.adjusted,
                ..entry.clone()
            },
        );
    }

    let previous_total = previous.map(|p| p.total_value).unwrap_or(Decimal::ZERO);
    let change = compute_daily_change(previous_total, figures.total_value, canonical_flow);

    DailyFigures {
        total_value: figures.total_value,
        total_investment: figures.total_investment,
        total_cash_flow: canonical_flow,
        raw_daily_change_percentage: change.raw,
        adjusted_daily_change_percentage: change.adjusted,
        daily_return: change.daily_return(),
        unrealized_pnl: figures.unrealized_pnl,
        done_profit_and_loss: figures.done_profit_and_loss,
        asset_performance,
    }
}

#[async_trait]
impl VerificationServiceTrait for VerificationService {
    async fn verify_scope(
        &self,
        scope_id: &str,
        mode: VerificationMode,
    ) -> Result<VerificationReport> {
        let records = self
            .performance_repository
            .get_daily_records(scope_id, None, None)?;

        let mut report = VerificationReport::new(mode);
        report.scanned = records.len() as u32;

        let mut pending: Vec<DailyPerformanceRecord> = Vec::new();
        let mut corrected_dates: Vec<NaiveDate> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            // A malformed record aborts the pending batch and the run;
            // batches already applied stay valid and the run can resume.
            if let Err(e) = self.check_well_formed(record) {
                pending.clear();
                return Err(e);
            }

            let previous = if index > 0 { records.get(index - 1) } else { None };
            let (corrected, discrepancies) = self.recompute_record(record, previous);

            if discrepancies.is_empty() {
                report.unchanged += 1;
            } else {
                report.flagged += 1;
                report.discrepancies.extend(discrepancies);
                corrected_dates.push(record.date);
                pending.push(corrected);
                if pending.len() >= self.config.batch_size {
                    self.flush_batch(&mut pending, mode, &mut report).await?;
                }
            }
        }
        self.flush_batch(&mut pending, mode, &mut report).await?;

        if mode == VerificationMode::Fix {
            self.emit_corrections(
                vec![scope_id.to_string()],
                &corrected_dates,
                report.corrected,
            );
        }

        info!(
            "Verification of scope '{}' ({:?}): {} scanned, {} flagged, {} corrected",
            scope_id, mode, report.scanned, report.flagged, report.corrected
        );

        Ok(report)
    }

    async fn verify_overall_against_accounts(
        &self,
        account_scope_ids: &[String],
        mode: VerificationMode,
    ) -> Result<VerificationReport> {
        let overall_records = self
            .performance_repository
            .get_daily_records(PORTFOLIO_TOTAL_SCOPE_ID, None, None)?;

        let mut account_records_by_date: BTreeMap<NaiveDate, Vec<DailyPerformanceRecord>> =
            BTreeMap::new();
        for account_id in account_scope_ids {
            for record in self
                .performance_repository
                .get_daily_records(account_id, None, None)?
            {
                account_records_by_date
                    .entry(record.date)
                    .or_default()
                    .push(record);
            }
        }

        let mut report = VerificationReport::new(mode);
        report.scanned = overall_records.len() as u32;

        let mut pending: Vec<DailyPerformanceRecord> = Vec::new();
        let mut corrected_dates: Vec<NaiveDate> = Vec::new();

        for (index, record) in overall_records.iter().enumerate() {
            if let Err(e) = self.check_well_formed(record) {
                pending.clear();
                return Err(e);
            }

            let previous = if index > 0 {
                overall_records.get(index - 1)
            } else {
                None
            };

            let mut corrected = record.clone();
            let mut discrepancies = Vec::new();

            for (&currency, figures) in &record.currencies {
                let previous_figures = previous.and_then(|p| p.figures(currency));
                let Some(prev) = previous_figures else {
                    continue;
                };

                // Canonical overall flow: the direct sum of the account
                // records' asset-level flows for the same date.
                let Some(day_accounts) = account_records_by_date.get(&record.date) else {
                    debug!(
                        "No account records on {} to cross-check the overall record",
                        record.date
                    );
                    continue;
                };
                let account_flow_sum: Decimal = day_accounts
                    .iter()
                    .filter_map(|r| r.figures(currency))
                    .map(|f| f.asset_cash_flow_sum())
                    .sum();

                let expected =
                    compute_daily_change(prev.total_value, figures.total_value, account_flow_sum);
                let delta = (expected.adjusted - figures.adjusted_daily_change_percentage).abs();
                if delta > self.config.cross_scope_tolerance_pp {
                    discrepancies.push(Discrepancy {
                        scope_id: record.scope_id.clone(),
                        date: record.date,
                        currency,
                        field: DiscrepancyField::CrossScopeAdjusted,
                        stored: figures.adjusted_daily_change_percentage,
                        expected: expected.adjusted,
                    });
                    corrected.currencies.insert(
                        currency,
                        rebuild_slice(figures, previous_figures, account_flow_sum),
                    );
                }
            }

            if discrepancies.is_empty() {
                report.unchanged += 1;
            } else {
                report.flagged += 1;
                report.discrepancies.extend(discrepancies);
                corrected_dates.push(record.date);
                pending.push(corrected);
                if pending.len() >= self.config.batch_size {
                    self.flush_batch(&mut pending, mode, &mut report).await?;
                }
            }
        }
        self.flush_batch(&mut pending, mode, &mut report).await?;

        if mode == VerificationMode::Fix {
            self.emit_corrections(
                vec![PORTFOLIO_TOTAL_SCOPE_ID.to_string()],
                &corrected_dates,
                report.corrected,
            );
        }

        Ok(report)
    }
}
