#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal_macros::dec;
use std::io::Write;
use std::path::Path;
use txstore::infrastructure::in_memory::InMemoryTransactionStore;
use txstore::{Currency, Money, Transaction, TransactionStoreBox};
use uuid::Uuid;

pub const SUCCESSFUL_ORDER_ID: &str = "PASSED-ORDER-ID-1";
pub const FAILED_ORDER_ID: &str = "FAILED-ORDER-ID-2";

pub fn successful_txn_id() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, b"PASSED-TXNID-1")
}

pub fn failed_txn_id() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, b"FAILED-TXNID-2")
}

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap() + Duration::nanoseconds(123_456_789)
}

pub fn succeeded() -> Transaction {
    Transaction::new(
        successful_txn_id(),
        now(),
        "accepted",
        SUCCESSFUL_ORDER_ID,
        Money::new(Currency::INR, dec!(2000.45)),
    )
}

pub fn failed() -> Transaction {
    Transaction::new(
        failed_txn_id(),
        now() + Duration::seconds(1),
        "failed",
        FAILED_ORDER_ID,
        Money::new(Currency::INR, dec!(99.99)),
    )
}

/// A retry of the successful order, recorded later than the original.
pub fn retried() -> Transaction {
    Transaction::new(
        Uuid::new_v5(&Uuid::NAMESPACE_OID, b"RETRIED-TXNID-3"),
        now() + Duration::seconds(2),
        "accepted",
        SUCCESSFUL_ORDER_ID,
        Money::new(Currency::INR, dec!(2000.45)),
    )
}

/// A store plus whatever must outlive it (e.g. its temp directory).
pub struct Harness {
    pub store: TransactionStoreBox,
    _guard: Option<tempfile::TempDir>,
}

pub async fn in_memory_harness() -> Harness {
    Harness {
        store: Box::new(InMemoryTransactionStore::new()),
        _guard: None,
    }
}

#[cfg(feature = "storage-rocksdb")]
pub async fn rocksdb_harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let store = txstore::infrastructure::rocksdb::RocksDBStore::open(dir.path()).unwrap();
    Harness {
        store: Box::new(store),
        _guard: Some(dir),
    }
}

#[cfg(feature = "storage-sqlite")]
pub async fn sqlite_harness() -> Harness {
    let store = txstore::infrastructure::sqlite::SqliteTransactionStore::in_memory()
        .await
        .unwrap();
    Harness {
        store: Box::new(store),
        _guard: None,
    }
}

pub fn write_csv(path: &Path, rows: &[&str]) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "id, date, status, order_id, currency, amount").unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
}
