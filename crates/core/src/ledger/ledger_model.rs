//! Transaction ledger domain models.
//!
//! The ledger is an external collaborator: transactions are ingested and
//! persisted elsewhere and read here through `LedgerRepositoryTrait`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction kinds recognized by the cash-flow attributor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Purchase of units; capital committed to the asset
    Buy,
    /// Sale of units; capital released from the asset
    Sell,
    /// Cash deposited into the entity (capital injection)
    CashIncome,
    /// Cash withdrawn from the entity (capital removal)
    CashOutcome,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Buy => "BUY",
            TransactionType::Sell => "SELL",
            TransactionType::CashIncome => "CASH_INCOME",
            TransactionType::CashOutcome => "CASH_OUTCOME",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single ledger entry for one asset on one date, in the reference currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub scope_id: String,
    pub asset_key: String,
    pub date: NaiveDate,
    pub kind: TransactionType,
    /// Units for BUY/SELL, cash amount for CASH_INCOME/CASH_OUTCOME
    pub amount: Decimal,
    /// Unit price for BUY/SELL; ignored for cash kinds
    pub price: Decimal,
}

impl Transaction {
    /// Signed cash flow of this transaction.
    ///
    /// Sign convention: negative = capital added (deposit/buy),
    /// positive = capital removed (withdrawal/sell proceeds).
    pub fn signed_flow(&self) -> Decimal {
        match self.kind {
            TransactionType::Buy => -(self.amount * self.price),
            TransactionType::Sell => self.amount * self.price,
            TransactionType::CashIncome => -self.amount,
            TransactionType::CashOutcome => self.amount,
        }
    }

    /// Signed change in unit count implied by this transaction.
    pub fn units_delta(&self) -> Decimal {
        match self.kind {
            TransactionType::Buy => self.amount,
            TransactionType::Sell => -self.amount,
            TransactionType::CashIncome | TransactionType::CashOutcome => Decimal::ZERO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tx(kind: TransactionType, amount: Decimal, price: Decimal) -> Transaction {
        Transaction {
            id: "tx-1".to_string(),
            scope_id: "acc-1".to_string(),
            asset_key: "AAPL".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            kind,
            amount,
            price,
        }
    }

    #[test]
    fn test_buy_is_negative_flow() {
        let t = tx(TransactionType::Buy, dec!(10), dec!(50));
        assert_eq!(t.signed_flow(), dec!(-500));
        assert_eq!(t.units_delta(), dec!(10));
    }

    #[test]
    fn test_sell_is_positive_flow() {
        let t = tx(TransactionType::Sell, dec!(4), dec!(25));
        assert_eq!(t.signed_flow(), dec!(100));
        assert_eq!(t.units_delta(), dec!(-4));
    }

    #[test]
    fn test_cash_income_is_negative_flow() {
        let t = tx(TransactionType::CashIncome, dec!(1000), Decimal::ZERO);
        assert_eq!(t.signed_flow(), dec!(-1000));
        assert_eq!(t.units_delta(), Decimal::ZERO);
    }

    #[test]
    fn test_cash_outcome_is_positive_flow() {
        let t = tx(TransactionType::CashOutcome, dec!(250), Decimal::ZERO);
        assert_eq!(t.signed_flow(), dec!(250));
    }

    #[test]
    fn test_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TransactionType::CashIncome).unwrap(),
            "\"CASH_INCOME\""
        );
        assert_eq!(
            serde_json::from_str::<TransactionType>("\"BUY\"").unwrap(),
            TransactionType::Buy
        );
    }
}
