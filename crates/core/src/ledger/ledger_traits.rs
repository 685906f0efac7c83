use chrono::NaiveDate;

use super::Transaction;
use crate::errors::Result;

/// Read access to the transaction ledger.
///
/// Implemented by the storage crate. Transactions are returned ordered by
/// date, then by insertion order within a date.
pub trait LedgerRepositoryTrait: Send + Sync {
    /// All transactions for the scope within the date range (inclusive).
    fn get_transactions_in_range(
        &self,
        scope_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Transaction>>;
}
