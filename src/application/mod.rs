//! Application layer orchestrating the transaction store.
//!
//! This module defines the `TransactionService` which acts as the primary entry point
//! for recording payment events and answering status checks. It owns a boxed
//! [`TransactionStore`](crate::domain::ports::TransactionStore), so any backend can be injected.

pub mod service;
