use super::row::{self, StoredTransaction};
use crate::domain::ports::TransactionStore;
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// A thread-safe in-memory store for transactions.
///
/// Uses `Arc<RwLock<HashMap<Uuid, StoredTransaction>>>` for shared concurrent access.
/// Batch operations run under a single write lock, so they are atomic as a set.
/// Nothing survives the process; intended for tests and throwaway runs.
#[derive(Default, Clone)]
pub struct InMemoryTransactionStore {
    rows: Arc<RwLock<HashMap<Uuid, StoredTransaction>>>,
}

impl InMemoryTransactionStore {
    /// Creates a new, empty in-memory transaction store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current optimistic-lock version of a row.
    pub async fn version_of(&self, id: Uuid) -> Option<u64> {
        self.rows.read().await.get(&id).map(|row| row.version)
    }

    fn upsert(rows: &mut HashMap<Uuid, StoredTransaction>, txn: Transaction) {
        let next = StoredTransaction::succeeding(rows.get(&txn.id()), txn);
        rows.insert(next.transaction.id(), next);
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn save(&self, txn: Transaction) -> Result<Transaction> {
        debug!(id = %txn.id(), order_id = txn.order_id(), "saving transaction");
        let mut rows = self.rows.write().await;
        Self::upsert(&mut rows, txn.clone());
        Ok(txn)
    }

    async fn save_all(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
        debug!(count = txns.len(), "saving transaction batch");
        let mut rows = self.rows.write().await;
        for txn in &txns {
            Self::upsert(&mut rows, txn.clone());
        }
        Ok(txns)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).map(|row| row.transaction.clone()))
    }

    async fn find_all_by_id(&self, ids: &[Uuid]) -> Result<Vec<Transaction>> {
        let rows = self.rows.read().await;
        let found = ids
            .iter()
            .filter_map(|id| rows.get(id))
            .map(|row| (row.transaction.id(), row.transaction.clone()))
            .collect();
        Ok(row::in_request_order(ids, found))
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.rows.read().await.contains_key(&id))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.read().await.len() as u64)
    }

    async fn find_all(&self) -> Result<Vec<Transaction>> {
        let rows = self.rows.read().await;
        let mut all: Vec<Transaction> = rows.values().map(|row| row.transaction.clone()).collect();
        row::sort_chronologically(&mut all);
        Ok(all)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        debug!(%id, "deleting transaction");
        let mut rows = self.rows.write().await;
        rows.remove(&id).map(|_| ()).ok_or(PaymentError::NotFound(id))
    }

    async fn delete_all_by_id(&self, ids: &[Uuid]) -> Result<()> {
        debug!(count = ids.len(), "deleting transaction batch");
        let mut rows = self.rows.write().await;
        for id in ids {
            rows.remove(id);
        }
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>> {
        let rows = self.rows.read().await;
        Ok(row::earliest(
            rows.values()
                .filter(|row| row.transaction.order_id() == order_id)
                .map(|row| row.transaction.clone()),
        ))
    }

    async fn find_all_by_order_ids(&self, order_ids: &[String]) -> Result<Vec<Transaction>> {
        let wanted: HashSet<&str> = order_ids.iter().map(String::as_str).collect();
        let rows = self.rows.read().await;
        let mut matching: Vec<Transaction> = rows
            .values()
            .filter(|row| wanted.contains(row.transaction.order_id()))
            .map(|row| row.transaction.clone())
            .collect();
        row::sort_chronologically(&mut matching);
        Ok(matching)
    }
}
