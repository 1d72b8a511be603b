//! Ranking wrapper around a pooled transaction.

use chrono::{DateTime, Utc};
use neo_core::io::Serializable;
use neo_core::network::payloads::Transaction;
use neo_primitives::UInt256;
use std::cmp::Ordering;

/// Sort key of a pooled transaction. Greater keys rank higher.
///
/// High-priority transactions outrank every other one, then fee per byte,
/// then absolute network fee. The lower hash wins remaining ties so the order
/// is total and deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub high_priority: bool,
    pub fee_per_byte: i64,
    pub network_fee: i64,
    pub hash: UInt256,
}

impl PoolKey {
    pub fn of(tx: &Transaction) -> Self {
        Self {
            high_priority: tx.is_high_priority(),
            fee_per_byte: tx.fee_per_byte(),
            network_fee: tx.network_fee,
            hash: tx.hash(),
        }
    }
}

impl Ord for PoolKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.high_priority
            .cmp(&other.high_priority)
            .then_with(|| self.fee_per_byte.cmp(&other.fee_per_byte))
            .then_with(|| self.network_fee.cmp(&other.network_fee))
            .then_with(|| other.hash.cmp(&self.hash))
    }
}

impl PartialOrd for PoolKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Represents an item in the memory pool.
#[derive(Debug, Clone)]
pub struct PoolItem {
    tx: Transaction,
    key: PoolKey,
    size: usize,
    timestamp: DateTime<Utc>,
    last_broadcast_timestamp: DateTime<Utc>,
}

impl PoolItem {
    pub fn new(tx: Transaction, now: DateTime<Utc>) -> Self {
        Self {
            key: PoolKey::of(&tx),
            size: tx.size(),
            tx,
            timestamp: now,
            last_broadcast_timestamp: now,
        }
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }

    pub fn into_tx(self) -> Transaction {
        self.tx
    }

    pub fn hash(&self) -> UInt256 {
        self.key.hash
    }

    pub fn key(&self) -> PoolKey {
        self.key
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// When the transaction entered the pool.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn last_broadcast_timestamp(&self) -> DateTime<Utc> {
        self.last_broadcast_timestamp
    }

    pub fn set_last_broadcast_timestamp(&mut self, at: DateTime<Utc>) {
        self.last_broadcast_timestamp = at;
    }

    /// Compares this item's rank with a transaction that is not pooled.
    pub fn compare_to(&self, tx: &Transaction) -> Ordering {
        self.key.cmp(&PoolKey::of(tx))
    }
}

impl PartialEq for PoolItem {
    fn eq(&self, other: &Self) -> bool {
        self.key.hash == other.key.hash
    }
}

impl Eq for PoolItem {}

impl PartialOrd for PoolItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PoolItem {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}
