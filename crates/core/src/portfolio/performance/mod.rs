//! Performance module - daily return math, cash-flow attribution, chaining.

pub mod cash_flow;
pub mod daily_return;
mod performance_model;
mod performance_service;
mod performance_traits;
pub mod return_chainer;

pub use cash_flow::{attribute_flows, attribute_units, detect_implied_flow, ImpliedFlow};
pub use daily_return::{compute_daily_change, DailyChange};
pub use performance_model::{AssetFigures, DailyFigures, DailyPerformanceRecord};
pub use performance_service::{PerformanceService, PerformanceServiceTrait};
pub use performance_traits::PerformanceRepositoryTrait;
pub use return_chainer::{modified_dietz, TwrChain};
