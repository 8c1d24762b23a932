//! Storage row shared by the backends.

use crate::domain::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// A persisted transaction plus its optimistic-lock version.
///
/// The version starts at 0 and is bumped every time the same id is written
/// again. It never leaves the infrastructure layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub version: u64,
}

impl StoredTransaction {
    pub fn first(transaction: Transaction) -> Self {
        Self {
            transaction,
            version: 0,
        }
    }

    /// Row written over `previous`, if there was one.
    pub fn succeeding(previous: Option<&StoredTransaction>, transaction: Transaction) -> Self {
        match previous {
            Some(prev) => Self {
                transaction,
                version: prev.version + 1,
            },
            None => Self::first(transaction),
        }
    }
}

pub(crate) fn sort_chronologically(txns: &mut [Transaction]) {
    txns.sort_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(&b.id())));
}

pub(crate) fn earliest(txns: impl IntoIterator<Item = Transaction>) -> Option<Transaction> {
    txns.into_iter().min_by(|a, b| a.date().cmp(&b.date()).then_with(|| a.id().cmp(&b.id())))
}

/// Arranges `found` in the order of `ids`, once per distinct id.
pub(crate) fn in_request_order(ids: &[Uuid], mut found: HashMap<Uuid, Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| found.remove(id))
        .collect()
}
