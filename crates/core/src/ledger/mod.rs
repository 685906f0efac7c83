//! Transaction ledger - models and repository trait.

mod ledger_model;
mod ledger_traits;

pub use ledger_model::{Transaction, TransactionType};
pub use ledger_traits::LedgerRepositoryTrait;
