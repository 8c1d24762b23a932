use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A recorded payment event.
///
/// Values are never mutated in place. A status change is expressed with
/// [`Transaction::with_status`] and persisted as an update keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transaction {
    id: Uuid,
    date: DateTime<Utc>,
    status: String,
    order_id: String,
    value: Money,
}

impl Transaction {
    pub fn new(
        id: Uuid,
        date: DateTime<Utc>,
        status: impl Into<String>,
        order_id: impl Into<String>,
        value: Money,
    ) -> Self {
        Self {
            id,
            date,
            status: status.into(),
            order_id: order_id.into(),
            value,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn date(&self) -> DateTime<Utc> {
        self.date
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn value(&self) -> Money {
        self.value
    }

    pub fn reference(&self) -> TransactionReference {
        TransactionReference {
            id: self.id,
            date: self.date,
            status: self.status.clone(),
        }
    }

    /// Returns a copy with a new status and status date, keeping id, order and value.
    pub fn with_status(&self, status: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            status: status.into(),
            date,
            ..self.clone()
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transaction{{id='{}', date={}, status='{}', orderId='{}', value={}}}",
            self.id,
            self.date.to_rfc3339(),
            self.status,
            self.order_id,
            self.value
        )
    }
}

/// The id/date/status projection of a [`Transaction`], used for status checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionReference {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub status: String,
}

impl TransactionReference {
    /// "No reference": nil id, Unix epoch, empty status.
    pub const EMPTY: Self = Self {
        id: Uuid::nil(),
        date: DateTime::<Utc>::UNIX_EPOCH,
        status: String::new(),
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::EMPTY
    }
}

impl fmt::Display for TransactionReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TransactionReference{{date={}, id='{}', status='{}'}}",
            self.date.to_rfc3339(),
            self.id,
            self.status
        )
    }
}
