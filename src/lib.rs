//! A transaction record store.
//!
//! - **domain**: `Money`, `Transaction`, `TransactionReference` and the `TransactionStore` port.
//! - **infrastructure**: in-memory, RocksDB and SQLite implementations of the port.
//! - **application**: `TransactionService`, the use cases built on the port.
//! - **interfaces**: CSV import and export.

pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod interfaces;
pub mod logging;

pub use domain::currency::Currency;
pub use domain::money::Money;
pub use domain::ports::{TransactionStore, TransactionStoreBox, TransactionStoreFactory};
pub use domain::transaction::{Transaction, TransactionReference};
pub use error::{PaymentError, Result};
