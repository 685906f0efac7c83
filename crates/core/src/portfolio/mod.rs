pub mod consolidation;
pub mod performance;
pub mod snapshot;
pub mod verification;
