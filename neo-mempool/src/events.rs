//! Notifications raised when the pool content changes.

use neo_core::network::payloads::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why transactions left the pool without being persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionRemovalReason {
    /// Evicted to make room for a higher ranked transaction.
    CapacityExceeded,
    /// Failed re-verification against newer state.
    NoLongerValid,
    /// Conflicts with a persisted or newly admitted transaction.
    Conflict,
}

impl fmt::Display for TransactionRemovalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::CapacityExceeded => "capacity exceeded",
            Self::NoLongerValid => "no longer valid",
            Self::Conflict => "conflict",
        };
        f.write_str(reason)
    }
}

/// Subscriber to pool additions and removals.
///
/// Called after the pool lock is released, on the thread that mutated the pool.
pub trait MemoryPoolObserver: Send + Sync {
    fn transaction_added(&self, _tx: &Transaction) {}

    fn transaction_removed(&self, _txs: &[Transaction], _reason: TransactionRemovalReason) {}
}
