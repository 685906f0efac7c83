//! Snapshot module - end-of-day market values consumed by the daily pipeline.

mod snapshot_model;
mod snapshot_traits;

pub use snapshot_model::{AssetSnapshot, DailySnapshot};
pub use snapshot_traits::SnapshotRepositoryTrait;
