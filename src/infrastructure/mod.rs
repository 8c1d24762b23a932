//! Store backends and the configuration that picks one of them.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod row;
#[cfg(feature = "storage-sqlite")]
pub mod sqlite;

use crate::domain::ports::TransactionStoreBox;
use crate::error::Result;
use in_memory::InMemoryTransactionStore;
use std::path::PathBuf;
use tracing::info;

/// Which backend to open.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoreConfig {
    #[default]
    InMemory,
    /// RocksDB directory, requires the `storage-rocksdb` feature.
    RocksDb { path: PathBuf },
    /// SQLite URL such as `sqlite://txns.db`, requires the `storage-sqlite` feature.
    Sqlite { url: String },
}

impl StoreConfig {
    /// A RocksDB path wins over a SQLite URL; neither means in-memory.
    pub fn from_options(db_path: Option<PathBuf>, database_url: Option<String>) -> Self {
        match (db_path, database_url) {
            (Some(path), _) => Self::RocksDb { path },
            (None, Some(url)) => Self::Sqlite { url },
            (None, None) => Self::InMemory,
        }
    }
}

/// Opens the configured backend.
///
/// A backend whose feature was not compiled in falls back to in-memory storage
/// with a warning.
pub async fn open_store(config: &StoreConfig) -> Result<TransactionStoreBox> {
    match config {
        StoreConfig::InMemory => {
            info!("using in-memory transaction store");
            Ok(Box::new(InMemoryTransactionStore::new()))
        }
        #[cfg(feature = "storage-rocksdb")]
        StoreConfig::RocksDb { path } => {
            info!(path = %path.display(), "opening RocksDB transaction store");
            Ok(Box::new(self::rocksdb::RocksDBStore::open(path)?))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        StoreConfig::RocksDb { path } => {
            tracing::warn!(
                path = %path.display(),
                "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryTransactionStore::new()))
        }
        #[cfg(feature = "storage-sqlite")]
        StoreConfig::Sqlite { url } => {
            info!(%url, "connecting to SQLite transaction store");
            Ok(Box::new(self::sqlite::SqliteTransactionStore::connect(url).await?))
        }
        #[cfg(not(feature = "storage-sqlite"))]
        StoreConfig::Sqlite { url } => {
            tracing::warn!(
                %url,
                "Relational storage requested via --database-url, but 'storage-sqlite' feature is not enabled. Falling back to in-memory storage."
            );
            Ok(Box::new(InMemoryTransactionStore::new()))
        }
    }
}
