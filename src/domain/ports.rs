use super::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence contract for [`Transaction`] records.
///
/// Every backend follows the same policies:
/// - `save` upserts by id.
/// - `delete_by_id` fails with [`PaymentError::NotFound`] for an unknown id, while
///   `delete`, `delete_all` and `delete_all_by_id` ignore absent records.
/// - Sequences come back ordered by `(date, id)`, except `find_all_by_id` which
///   follows the order of the requested ids and skips missing ones.
/// - Batch writes are applied atomically.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn save(&self, txn: Transaction) -> Result<Transaction>;
    async fn save_all(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>>;
    async fn find_all_by_id(&self, ids: &[Uuid]) -> Result<Vec<Transaction>>;
    async fn exists_by_id(&self, id: Uuid) -> Result<bool>;
    async fn count(&self) -> Result<u64>;
    async fn find_all(&self) -> Result<Vec<Transaction>>;

    async fn delete_by_id(&self, id: Uuid) -> Result<()>;
    async fn delete_all_by_id(&self, ids: &[Uuid]) -> Result<()>;

    async fn delete(&self, txn: &Transaction) -> Result<()> {
        match self.delete_by_id(txn.id()).await {
            Err(PaymentError::NotFound(_)) => Ok(()),
            other => other,
        }
    }

    async fn delete_all(&self, txns: &[Transaction]) -> Result<()> {
        let ids: Vec<Uuid> = txns.iter().map(Transaction::id).collect();
        self.delete_all_by_id(&ids).await
    }

    /// Returns the earliest transaction of the order when several share it.
    /// Prefer [`TransactionStore::find_all_by_order_ids`] for orders with retries.
    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>>;

    async fn find_by_transaction_id_and_order_id(
        &self,
        id: Uuid,
        order_id: &str,
    ) -> Result<Option<Transaction>> {
        Ok(self
            .find_by_id(id)
            .await?
            .filter(|txn| txn.order_id() == order_id))
    }

    async fn find_all_by_order_ids(&self, order_ids: &[String]) -> Result<Vec<Transaction>>;
}

pub type TransactionStoreBox = Box<dyn TransactionStore>;
pub type TransactionStoreFactory = Box<dyn Fn() -> TransactionStoreBox + Send + Sync>;
