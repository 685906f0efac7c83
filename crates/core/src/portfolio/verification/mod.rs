//! Verification module - consistency checks and idempotent correction.

mod verification_model;
mod verification_service;

pub use verification_model::{
    Discrepancy, DiscrepancyField, VerificationConfig, VerificationError, VerificationMode,
    VerificationReport,
};
pub use verification_service::{VerificationService, VerificationServiceTrait};
