//! Period consolidation.
//!
//! Rolls daily records into monthly records and monthly records into yearly
//! ones. Factor chaining is restartable: a month seeds its start factor from
//! the prior month's stored end factor, and a year is the product of its
//! months' factor ratios - raw daily data is never re-read at year level.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::debug;
use rust_decimal::Decimal;

use super::period_stats::{annualized_return, max_drawdown, volatility, PeriodStatistics};
use super::{ConsolidatedPeriodRecord, ConsolidationRepositoryTrait, PeriodFigures, PeriodType};
use crate::errors::Result;
use crate::events::{DomainEvent, DomainEventSink, NoOpDomainEventSink};
use crate::fx::{Currency, EngineConfig};
use crate::portfolio::performance::{modified_dietz, PerformanceRepositoryTrait, TwrChain};
use crate::utils::time_utils::{month_bounds, month_key};

#[async_trait]
pub trait ConsolidationServiceTrait: Send + Sync {
    /// Consolidates one calendar month of daily records.
    ///
    /// Returns `None` when the month has no valid daily records - absence
    /// signals missing data, not flat performance.
    async fn consolidate_month(
        &self,
        scope_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<ConsolidatedPeriodRecord>>;

    /// Consolidates one calendar year from its stored monthly records.
    async fn consolidate_year(
        &self,
        scope_id: &str,
        year: i32,
    ) -> Result<Option<ConsolidatedPeriodRecord>>;

    /// Descriptive statistics over the scope's daily returns in a range.
    fn period_statistics(
        &self,
        scope_id: &str,
        currency: Currency,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<PeriodStatistics>>;
}

#[derive(Clone)]
pub struct ConsolidationService {
    config: EngineConfig,
    performance_repository: Arc<dyn PerformanceRepositoryTrait>,
    consolidation_repository: Arc<dyn ConsolidationRepositoryTrait>,
    event_sink: Arc<dyn DomainEventSink>,
}

impl ConsolidationService {
    pub fn new(
        config: EngineConfig,
        performance_repository: Arc<dyn PerformanceRepositoryTrait>,
        consolidation_repository: Arc<dyn ConsolidationRepositoryTrait>,
    ) -> Self {
        Self {
            config,
            performance_repository,
            consolidation_repository,
            event_sink: Arc::new(NoOpDomainEventSink),
        }
    }

    /// Sets the domain event sink for this service.
    pub fn with_event_sink(mut self, event_sink: Arc<dyn DomainEventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    fn next_version(&self, scope_id: &str, period_type: PeriodType, key: &str) -> Result<u32> {
        Ok(self
            .consolidation_repository
            .get_period_record(scope_id, period_type, key)?
            .map(|r| r.version + 1)
            .unwrap_or(1))
    }
}

fn previous_month_key(year: i32, month: u32) -> String {
    if month == 1 {
        format!("{:04}-12", year - 1)
    } else {
        format!("{:04}-{:02}", year, month - 1)
    }
}

#[async_trait]
impl ConsolidationServiceTrait for ConsolidationService {
    async fn consolidate_month(
        &self,
        scope_id: &str,
        year: i32,
        month: u32,
    ) -> Result<Option<ConsolidatedPeriodRecord>> {
        let anchor = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            crate::errors::Error::Unexpected(format!("invalid month {}-{}", year, month))
        })?;
        let (first_day, last_day) = month_bounds(anchor);
        let key = month_key(anchor);

        let daily_records =
            self.performance_repository
                .get_daily_records(scope_id, Some(first_day), Some(last_day))?;
        if daily_records.is_empty() {
            debug!("No daily records for scope '{}' in {}", scope_id, key);
            return Ok(None);
        }

        let prior_month = self.consolidation_repository.get_period_record(
            scope_id,
            PeriodType::Month,
            &previous_month_key(year, month),
        )?;

        let mut record = ConsolidatedPeriodRecord::new(
            scope_id,
            PeriodType::Month,
            &key,
            self.next_version(scope_id, PeriodType::Month, &key)?,
        );

        for &currency in &self.config.tracked_currencies {
            let slices: Vec<_> = daily_records
                .iter()
                .filter_map(|r| r.figures(currency))
                .collect();
            if slices.is_empty() {
                continue;
            }

            let start_factor = prior_month
                .as_ref()
                .and_then(|m| m.figures(currency))
                .map(|f| f.end_factor)
                .unwrap_or(Decimal::ONE);

            let mut chain = TwrChain::seeded(start_factor);
            let mut total_cash_flow = Decimal::ZERO;
            for slice in &slices {
                chain.push(slice.adjusted_daily_change_percentage);
                total_cash_flow += slice.total_cash_flow;
            }

            let start_total_value = slices.first().expect("non-empty").total_value;
            let end_total_value = slices.last().expect("non-empty").total_value;
            let end_factor = chain.factor();

            let mut period_chain = TwrChain::new();
            period_chain.push_factor_span(start_factor, end_factor);

            record.currencies.insert(
                currency,
                PeriodFigures {
                    start_total_value,
                    end_total_value,
                    start_factor,
                    end_factor,
                    period_return: period_chain.period_return_pct(),
                    personal_return: modified_dietz(
                        start_total_value,
                        end_total_value,
                        total_cash_flow,
                    ),
                    total_cash_flow,
                    docs_count: daily_records.len() as u32,
                    valid_docs_count: slices.len() as u32,
                },
            );
        }

        if record.currencies.is_empty() {
            return Ok(None);
        }

        self.consolidation_repository
            .save_period_records(std::slice::from_ref(&record))
            .await?;
        self.event_sink.emit(DomainEvent::periods_consolidated(
            scope_id.to_string(),
            PeriodType::Month,
            vec![key],
        ));

        Ok(Some(record))
    }

    async fn consolidate_year(
        &self,
        scope_id: &str,
        year: i32,
    ) -> Result<Option<ConsolidatedPeriodRecord>> {
        let key = format!("{:04}", year);
        let months = self.consolidation_repository.get_period_records_in_range(
            scope_id,
            PeriodType::Month,
            &format!("{:04}-01", year),
            &format!("{:04}-12", year),
        )?;
        if months.is_empty() {
            debug!("No monthly records for scope '{}' in {}", scope_id, key);
            return Ok(None);
        }

        let mut record = ConsolidatedPeriodRecord::new(
            scope_id,
            PeriodType::Year,
            &key,
            self.next_version(scope_id, PeriodType::Year, &key)?,
        );

        for &currency in &self.config.tracked_currencies {
            let slices: Vec<_> = months
                .iter()
                .filter_map(|m| m.figures(currency))
                .collect();
            if slices.is_empty() {
                continue;
            }

            let start_factor = slices.first().expect("non-empty").start_factor;
            let mut chain = TwrChain::seeded(start_factor);
            let mut total_cash_flow = Decimal::ZERO;
            let mut docs_count = 0u32;
            let mut valid_docs_count = 0u32;
            for month_figures in &slices {
                chain.push_factor_span(month_figures.start_factor, month_figures.end_factor);
                total_cash_flow += month_figures.total_cash_flow;
                docs_count += month_figures.docs_count;
                valid_docs_count += month_figures.valid_docs_count;
            }

            let start_total_value = slices.first().expect("non-empty").start_total_value;
            let end_total_value = slices.last().expect("non-empty").end_total_value;
            let end_factor = chain.factor();

            let mut period_chain = TwrChain::new();
            period_chain.push_factor_span(start_factor, end_factor);

            record.currencies.insert(
                currency,
                PeriodFigures {
                    start_total_value,
                    end_total_value,
                    start_factor,
                    end_factor,
                    period_return: period_chain.period_return_pct(),
                    personal_return: modified_dietz(
                        start_total_value,
                        end_total_value,
                        total_cash_flow,
                    ),
                    total_cash_flow,
                    docs_count,
                    valid_docs_count,
                },
            );
        }

        if record.currencies.is_empty() {
            return Ok(None);
        }

        self.consolidation_repository
            .save_period_records(std::slice::from_ref(&record))
            .await?;
        self.event_sink.emit(DomainEvent::periods_consolidated(
            scope_id.to_string(),
            PeriodType::Year,
            vec![key],
        ));

        Ok(Some(record))
    }

    fn period_statistics(
        &self,
        scope_id: &str,
        currency: Currency,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<PeriodStatistics>> {
        let daily_records = self.performance_repository.get_daily_records(
            scope_id,
            Some(start_date),
            Some(end_date),
        )?;

        let daily_returns: Vec<Decimal> = daily_records
            .iter()
            .filter_map(|r| r.figures(currency))
            .map(|f| f.daily_return)
            .collect();
        if daily_returns.is_empty() {
            return Ok(None);
        }

        let mut chain = TwrChain::new();
        for r in &daily_returns {
            chain.push(*r * Decimal::ONE_HUNDRED);
        }
        let cumulative = chain.factor() - Decimal::ONE;

        let first_date = daily_records.first().expect("non-empty").date;
        let last_date = daily_records.last().expect("non-empty").date;

        Ok(Some(PeriodStatistics {
            annualized_return: annualized_return(first_date, last_date, cumulative),
            volatility: volatility(&daily_returns),
            max_drawdown: max_drawdown(&daily_returns),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_month_key_rolls_over_year() {
        assert_eq!(previous_month_key(2024, 1), "2023-12");
        assert_eq!(previous_month_key(2024, 7), "2024-06");
    }
}
