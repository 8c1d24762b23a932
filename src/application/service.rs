use crate::domain::money::Money;
use crate::domain::ports::{TransactionStore, TransactionStoreBox};
use crate::domain::transaction::{Transaction, TransactionReference};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

/// Records payment events and answers status checks on top of a store.
///
/// `TransactionService` owns the storage backend. Each call maps onto one or
/// two store operations, and atomicity is whatever the backend provides.
pub struct TransactionService {
    store: TransactionStoreBox,
}

impl TransactionService {
    /// Creates a new `TransactionService` instance.
    ///
    /// # Arguments
    ///
    /// * `store` - The store for transaction records.
    pub fn new(store: TransactionStoreBox) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn TransactionStore {
        self.store.as_ref()
    }

    pub async fn record(&self, txn: Transaction) -> Result<Transaction> {
        debug!(id = %txn.id(), status = txn.status(), "recording transaction");
        self.store.save(txn).await
    }

    pub async fn record_all(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
        let saved = self.store.save_all(txns).await?;
        info!(count = saved.len(), "recorded transactions");
        Ok(saved)
    }

    /// Persists a new status for an existing transaction.
    ///
    /// Fails with `NotFound` if the id is unknown.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
        date: DateTime<Utc>,
    ) -> Result<Transaction> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(PaymentError::NotFound(id))?;
        debug!(%id, from = current.status(), to = status, "updating transaction status");
        self.store.save(current.with_status(status, date)).await
    }

    /// Reference of the most recent transaction of an order, or
    /// [`TransactionReference::EMPTY`] if the order has none.
    pub async fn status_of(&self, order_id: &str) -> Result<TransactionReference> {
        let attempts = self
            .store
            .find_all_by_order_ids(&[order_id.to_string()])
            .await?;
        Ok(attempts
            .iter()
            .max_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(&b.id())))
            .map(Transaction::reference)
            .unwrap_or(TransactionReference::EMPTY))
    }

    /// Sum of every transaction value recorded for the given orders.
    ///
    /// Starts from [`Money::ZERO`]; mixing non-zero currencies fails with `CurrencyMismatch`.
    pub async fn total_for_orders(&self, order_ids: &[String]) -> Result<Money> {
        self.store
            .find_all_by_order_ids(order_ids)
            .await?
            .iter()
            .try_fold(Money::ZERO, |total, txn| total.try_add(&txn.value()))
    }

    /// Consumes the service and hands back the store.
    pub fn into_store(self) -> TransactionStoreBox {
        self.store
    }
}
