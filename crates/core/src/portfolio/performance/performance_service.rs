//! Daily performance pipeline.
//!
//! Builds one `DailyPerformanceRecord` per scope per date from the ledger
//! and the end-of-day snapshots. Within a scope the computation is strictly
//! date-ordered: each day's adjusted return is measured against the
//! previous day's *stored* value. Different scopes are independent and are
//! fanned out concurrently.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::errors::{CalculatorError, Error, Result};
use crate::fx::{convert_figures, EngineConfig, RateLookup};
use crate::ledger::{LedgerRepositoryTrait, Transaction, TransactionType};
use crate::portfolio::performance::cash_flow::{
    attribute_flows, detect_implied_flow,
};
use crate::portfolio::performance::daily_return::compute_daily_change;
use crate::portfolio::performance::{
    AssetFigures, DailyFigures, DailyPerformanceRecord, PerformanceRepositoryTrait,
};
use crate::portfolio::snapshot::{AssetSnapshot, DailySnapshot, SnapshotRepositoryTrait};

#[async_trait]
pub trait PerformanceServiceTrait: Send + Sync {
    /// Ensures daily records for the scope are calculated and stored.
    ///
    /// If `recalculate_all` is true, existing records are deleted and the
    /// full history is rebuilt. Otherwise calculation resumes from the day
    /// after the last stored record, using that record as the baseline.
    ///
    /// Returns the number of newly stored records.
    async fn calculate_daily_records(
        &self,
        scope_id: &str,
        recalculate_all: bool,
    ) -> Result<u32>;

    /// Runs `calculate_daily_records` for several scopes concurrently.
    /// Scopes are independent; only the per-scope sequence is ordered.
    async fn calculate_scopes(
        &self,
        scope_ids: &[String],
        recalculate_all: bool,
    ) -> Result<u32>;
}

/// Baseline carried from one date to the next within a scope.
struct PreviousState {
    total_value: Decimal,
    total_done_pnl: Decimal,
    assets: BTreeMap<String, AssetSnapshot>,
    asset_done_pnl: BTreeMap<String, Decimal>,
}

impl PreviousState {
    fn from_figures(figures: &DailyFigures) -> Self {
        Self {
            total_value: figures.total_value,
            total_done_pnl: figures.done_profit_and_loss,
            assets: figures
                .asset_performance
                .iter()
                .map(|(key, entry)| {
                    (
                        key.clone(),
                        AssetSnapshot {
                            units: entry.units,
                            value: entry.total_value,
                            investment: entry.total_investment,
                        },
                    )
                })
                .collect(),
            asset_done_pnl: figures
                .asset_performance
                .iter()
                .map(|(key, entry)| (key.clone(), entry.done_profit_and_loss))
                .collect(),
        }
    }
}

#[derive(Clone)]
pub struct PerformanceService {
    config: EngineConfig,
    performance_repository: Arc<dyn PerformanceRepositoryTrait>,
    snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
    ledger_repository: Arc<dyn LedgerRepositoryTrait>,
    rate_lookup: RateLookup,
}

impl PerformanceService {
    pub fn new(
        config: EngineConfig,
        performance_repository: Arc<dyn PerformanceRepositoryTrait>,
        snapshot_repository: Arc<dyn SnapshotRepositoryTrait>,
        ledger_repository: Arc<dyn LedgerRepositoryTrait>,
        rate_lookup: RateLookup,
    ) -> Self {
        Self {
            config,
            performance_repository,
            snapshot_repository,
            ledger_repository,
            rate_lookup,
        }
    }

    /// Builds the reference-currency slice for one date.
    fn build_reference_figures(
        snapshot: &DailySnapshot,
        transactions: &[Transaction],
        previous: Option<&PreviousState>,
    ) -> DailyFigures {
        let ledger_flows = attribute_flows(transactions);

        let mut asset_performance: BTreeMap<String, AssetFigures> = BTreeMap::new();
        let mut total_cash_flow = Decimal::ZERO;
        let mut total_done_pnl = previous.map(|p| p.total_done_pnl).unwrap_or(Decimal::ZERO);

        for (asset_key, asset_snapshot) in &snapshot.assets {
            let previous_asset = previous.and_then(|p| p.assets.get(asset_key));
            let ledger_flow = ledger_flows
                .get(asset_key)
                .copied()
                .unwrap_or(Decimal::ZERO);

            // Ledger gaps show up as unit changes with no matching flow;
            // the implied flow stands in for the missing entry.
            let (flow, implied) =
                match detect_implied_flow(asset_key, previous_asset, asset_snapshot, ledger_flow) {
                    Some(implied_flow) => (implied_flow.flow, true),
                    None => (ledger_flow, false),
                };

            let previous_value = previous_asset.map(|p| p.value).unwrap_or(Decimal::ZERO);
            let change = compute_daily_change(previous_value, asset_snapshot.value, flow);

            let realized = realized_gain(asset_key, transactions, previous_asset, asset_snapshot);
            let done_pnl = previous
                .and_then(|p| p.asset_done_pnl.get(asset_key).copied())
                .unwrap_or(Decimal::ZERO)
                + realized;
            total_done_pnl += realized;

            total_cash_flow += flow;
            asset_performance.insert(
                asset_key.clone(),
                AssetFigures {
                    units: asset_snapshot.units,
                    total_value: asset_snapshot.value,
                    total_investment: asset_snapshot.investment,
                    total_cash_flow: flow,
                    raw_daily_change_percentage: change.raw,
                    adjusted_daily_change_percentage: change.adjusted,
                    unrealized_profit_and_loss: asset_snapshot.value - asset_snapshot.investment,
                    done_profit_and_loss: done_pnl,
                    implied_cash_flow: implied,
                },
            );
        }

        // Entity-level flow must stay the sum of asset flows, never
        // re-derived from the ledger.
        let previous_total = previous.map(|p| p.total_value).unwrap_or(Decimal::ZERO);
        let change = compute_daily_change(previous_total, snapshot.total_value, total_cash_flow);

        DailyFigures {
            total_value: snapshot.total_value,
            total_investment: snapshot.total_investment,
            total_cash_flow,
            raw_daily_change_percentage: change.raw,
            adjusted_daily_change_percentage: change.adjusted,
            daily_return: change.daily_return(),
            unrealized_pnl: snapshot.total_value - snapshot.total_investment,
            done_profit_and_loss: total_done_pnl,
            asset_performance,
        }
    }

    /// Propagates the reference slice into every other tracked currency.
    /// A failed rate lookup skips that currency for the date and is
    /// reported; the record keeps the slices that did resolve.
    async fn propagate_currencies(
        &self,
        record: &mut DailyPerformanceRecord,
        reference: &DailyFigures,
    ) {
        for &currency in &self.config.tracked_currencies {
            if currency == self.config.reference_currency {
                continue;
            }
            match self.rate_lookup.rate_for_date(currency, record.date).await {
                Ok(rate) => {
                    record
                        .currencies
                        .insert(currency, convert_figures(reference, rate));
                }
                Err(e) => {
                    warn!(
                        "Skipping currency {} for scope '{}' on {}: {}",
                        currency, record.scope_id, record.date, e
                    );
                }
            }
        }
    }
}

/// Realized gain for one asset on one date: sell proceeds minus the cost
/// basis those sales removed (`prev_investment - curr_investment + buys`).
fn realized_gain(
    asset_key: &str,
    transactions: &[Transaction],
    previous: Option<&AssetSnapshot>,
    current: &AssetSnapshot,
) -> Decimal {
    let mut sell_proceeds = Decimal::ZERO;
    let mut buy_cost = Decimal::ZERO;
    for tx in transactions.iter().filter(|t| t.asset_key == asset_key) {
        match tx.kind {
            TransactionType::Sell => sell_proceeds += tx.amount * tx.price,
            TransactionType::Buy => buy_cost += tx.amount * tx.price,
            _ => {}
        }
    }
    if sell_proceeds.is_zero() {
        return Decimal::ZERO;
    }

    let previous_investment = previous.map(|p| p.investment).unwrap_or(Decimal::ZERO);
    let cost_removed = previous_investment - current.investment + buy_cost;
    sell_proceeds - cost_removed
}

#[async_trait]
impl PerformanceServiceTrait for PerformanceService {
    async fn calculate_daily_records(
        &self,
        scope_id: &str,
        recalculate_all: bool,
    ) -> Result<u32> {
        let mut previous: Option<PreviousState> = None;
        let mut start_date: Option<NaiveDate> = None;

        if recalculate_all {
            self.performance_repository.delete_records(scope_id).await?;
        } else if let Some(latest) = self.performance_repository.get_latest_record(scope_id)? {
            let baseline = latest.figures(self.config.reference_currency).ok_or_else(|| {
                Error::Calculation(CalculatorError::Calculation(format!(
                    "Stored record {} lacks a reference-currency slice",
                    latest.id
                )))
            })?;
            previous = Some(PreviousState::from_figures(baseline));
            start_date = latest.date.succ_opt();
        }

        let snapshots =
            self.snapshot_repository
                .get_daily_snapshots(scope_id, start_date, None)?;
        if snapshots.is_empty() {
            debug!("No new snapshots for scope '{}'", scope_id);
            return Ok(0);
        }

        let range_start = snapshots.first().expect("non-empty").date;
        let range_end = snapshots.last().expect("non-empty").date;
        let transactions =
            self.ledger_repository
                .get_transactions_in_range(scope_id, range_start, range_end)?;
        let mut transactions_by_date: BTreeMap<NaiveDate, Vec<Transaction>> = BTreeMap::new();
        for tx in transactions {
            transactions_by_date.entry(tx.date).or_default().push(tx);
        }

        let mut new_records = Vec::with_capacity(snapshots.len());
        let mut last_date: Option<NaiveDate> = None;

        for snapshot in &snapshots {
            if let Some(last) = last_date {
                if snapshot.date <= last {
                    return Err(Error::Calculation(CalculatorError::OutOfOrderRecords {
                        scope_id: scope_id.to_string(),
                        date: snapshot.date,
                    }));
                }
            }
            last_date = Some(snapshot.date);

            let day_transactions = transactions_by_date
                .get(&snapshot.date)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);

            let reference =
                Self::build_reference_figures(snapshot, day_transactions, previous.as_ref());

            let mut record = DailyPerformanceRecord::new(scope_id, snapshot.date);
            record
                .currencies
                .insert(self.config.reference_currency, reference.clone());
            self.propagate_currencies(&mut record, &reference).await;

            previous = Some(PreviousState::from_figures(&reference));
            new_records.push(record);
        }

        let count = new_records.len() as u32;
        self.performance_repository.save_records(&new_records).await?;
        debug!(
            "Stored {} daily records for scope '{}' ({}..{})",
            count, scope_id, range_start, range_end
        );

        Ok(count)
    }

    async fn calculate_scopes(
        &self,
        scope_ids: &[String],
        recalculate_all: bool,
    ) -> Result<u32> {
        let futures_per_scope = scope_ids
            .iter()
            .map(|scope_id| self.calculate_daily_records(scope_id, recalculate_all));

        let counts = futures::future::try_join_all(futures_per_scope).await?;
        Ok(counts.into_iter().sum())
    }
}
