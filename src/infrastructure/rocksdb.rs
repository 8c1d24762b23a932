use super::row::{self, StoredTransaction};
use crate::domain::ports::TransactionStore;
use crate::domain::transaction::Transaction;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

/// Column Family for storing transaction rows.
pub const CF_TRANSACTIONS: &str = "transactions";

/// A persistent store implementation using RocksDB.
///
/// Rows live in the `transactions` column family, keyed by the 16 raw bytes of
/// the transaction id, with a JSON [`StoredTransaction`] as value. Batches are
/// written through a single `WriteBatch`. Writers take `write_lock` so the
/// version read and the write that bumps it happen as one step.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the `transactions` column family exists.
    ///
    /// # Arguments
    ///
    /// * `path` - The filesystem path where the database will be stored.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_transactions = ColumnFamilyDescriptor::new(CF_TRANSACTIONS, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_transactions])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Current optimistic-lock version of a row.
    pub fn version_of(&self, id: Uuid) -> Result<Option<u64>> {
        Ok(self.read_row(id)?.map(|row| row.version))
    }

    fn cf(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_TRANSACTIONS).ok_or_else(|| {
            PaymentError::persistence(std::io::Error::other(
                "Transactions column family not found",
            ))
        })
    }

    fn read_row(&self, id: Uuid) -> Result<Option<StoredTransaction>> {
        let cf = self.cf()?;
        match self.db.get_pinned_cf(cf, id.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan(&self) -> Result<Vec<Transaction>> {
        let cf = self.cf()?;
        let mut all = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            let row: StoredTransaction = serde_json::from_slice(&value)?;
            all.push(row.transaction);
        }
        Ok(all)
    }

    /// Stages upserts into one batch, tracking versions of ids repeated within it.
    fn write_rows(&self, txns: &[Transaction]) -> Result<()> {
        let cf = self.cf()?;
        let mut staged: HashMap<Uuid, StoredTransaction> = HashMap::new();
        let mut batch = WriteBatch::default();

        for txn in txns {
            let previous = match staged.remove(&txn.id()) {
                Some(row) => Some(row),
                None => self.read_row(txn.id())?,
            };
            let next = StoredTransaction::succeeding(previous.as_ref(), txn.clone());
            batch.put_cf(cf, txn.id().as_bytes(), serde_json::to_vec(&next)?);
            staged.insert(txn.id(), next);
        }

        self.db.write(batch)?;
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for RocksDBStore {
    async fn save(&self, txn: Transaction) -> Result<Transaction> {
        debug!(id = %txn.id(), order_id = txn.order_id(), "saving transaction");
        let _guard = self.write_lock.lock().await;
        self.write_rows(std::slice::from_ref(&txn))?;
        Ok(txn)
    }

    async fn save_all(&self, txns: Vec<Transaction>) -> Result<Vec<Transaction>> {
        debug!(count = txns.len(), "saving transaction batch");
        let _guard = self.write_lock.lock().await;
        self.write_rows(&txns)?;
        Ok(txns)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.read_row(id)?.map(|row| row.transaction))
    }

    async fn find_all_by_id(&self, ids: &[Uuid]) -> Result<Vec<Transaction>> {
        let mut found = HashMap::new();
        for id in ids {
            if let Some(row) = self.read_row(*id)? {
                found.insert(*id, row.transaction);
            }
        }
        Ok(row::in_request_order(ids, found))
    }

    async fn exists_by_id(&self, id: Uuid) -> Result<bool> {
        let cf = self.cf()?;
        // Just check if the key exists without deserializing the value
        Ok(self.db.get_pinned_cf(cf, id.as_bytes())?.is_some())
    }

    async fn count(&self) -> Result<u64> {
        let cf = self.cf()?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }

    async fn find_all(&self) -> Result<Vec<Transaction>> {
        let mut all = self.scan()?;
        row::sort_chronologically(&mut all);
        Ok(all)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<()> {
        debug!(%id, "deleting transaction");
        let _guard = self.write_lock.lock().await;
        if !self.exists_by_id(id).await? {
            return Err(PaymentError::NotFound(id));
        }
        let cf = self.cf()?;
        self.db.delete_cf(cf, id.as_bytes())?;
        Ok(())
    }

    async fn delete_all_by_id(&self, ids: &[Uuid]) -> Result<()> {
        debug!(count = ids.len(), "deleting transaction batch");
        let _guard = self.write_lock.lock().await;
        let cf = self.cf()?;
        let mut batch = WriteBatch::default();
        for id in ids {
            batch.delete_cf(cf, id.as_bytes());
        }
        self.db.write(batch)?;
        Ok(())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Transaction>> {
        Ok(row::earliest(
            self.scan()?
                .into_iter()
                .filter(|txn| txn.order_id() == order_id),
        ))
    }

    async fn find_all_by_order_ids(&self, order_ids: &[String]) -> Result<Vec<Transaction>> {
        let mut matching: Vec<Transaction> = self
            .scan()?
            .into_iter()
            .filter(|txn| order_ids.iter().any(|wanted| wanted == txn.order_id()))
            .collect();
        row::sort_chronologically(&mut matching);
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::currency::Currency;
    use crate::domain::money::Money;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn txn() -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            Utc::now(),
            "accepted",
            "ORDER-1",
            Money::new(Currency::INR, dec!(2000.45)),
        )
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_TRANSACTIONS).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_rocksdb_concurrent_saves_bump_version_once_each() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let tx = txn();

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let update = tx.with_status(format!("attempt-{i}"), Utc::now());
            handles.push(tokio::spawn(async move { store.save(update).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.version_of(tx.id()).unwrap(), Some(15));
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_transaction_store() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let tx = txn();

        store.save(tx.clone()).await.unwrap();

        let retrieved = store.find_by_id(tx.id()).await.unwrap().unwrap();
        assert_eq!(retrieved, tx);
        assert_eq!(retrieved.value().amount().to_string(), "2000.45");

        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_versions_within_batch() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let tx = txn();
        let failed = tx.with_status("failed", Utc::now());

        store.save_all(vec![tx.clone(), failed.clone()]).await.unwrap();

        assert_eq!(store.version_of(tx.id()).unwrap(), Some(1));
        assert_eq!(store.count().await.unwrap(), 1);
        assert_eq!(store.find_by_id(tx.id()).await.unwrap(), Some(failed));
    }

    #[tokio::test]
    async fn test_rocksdb_reopen_keeps_rows() {
        let dir = tempdir().unwrap();
        let tx = txn();
        {
            let store = RocksDBStore::open(dir.path()).unwrap();
            store.save(tx.clone()).await.unwrap();
        }

        let reopened = RocksDBStore::open(dir.path()).unwrap();
        assert_eq!(reopened.find_by_id(tx.id()).await.unwrap(), Some(tx));
        assert_eq!(reopened.version_of(tx.id()).unwrap(), Some(0));
    }
}
