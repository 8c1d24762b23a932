//! CSV import and export of transactions.
//!
//! Both directions use the columns `id, date, status, order_id, currency, amount`.

pub mod transaction_reader;
pub mod transaction_writer;

use crate::domain::currency::Currency;
use crate::domain::money::Money;
use crate::domain::transaction::Transaction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HEADERS: [&str; 6] = ["id", "date", "status", "order_id", "currency", "amount"];

/// One CSV line.
///
/// `amount` goes through the decimal text codec so the reader never sees it as a float.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionRecord {
    id: Uuid,
    date: DateTime<Utc>,
    status: String,
    order_id: String,
    currency: Currency,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

impl From<TransactionRecord> for Transaction {
    fn from(record: TransactionRecord) -> Self {
        Transaction::new(
            record.id,
            record.date,
            record.status,
            record.order_id,
            Money::new(record.currency, record.amount),
        )
    }
}

impl From<&Transaction> for TransactionRecord {
    fn from(txn: &Transaction) -> Self {
        Self {
            id: txn.id(),
            date: txn.date(),
            status: txn.status().to_string(),
            order_id: txn.order_id().to_string(),
            currency: txn.value().currency(),
            amount: txn.value().amount(),
        }
    }
}
