//! # Neo Mempool
//!
//! The fee-ranked pool of transactions waiting for a block.
//!
//! - [`PoolItem`] and [`PoolKey`]: the ranking used for eviction and re-verification order
//! - [`TransactionVerificationContext`]: per-sender pending spend and oracle-response claims
//! - [`MemoryPool`]: verified and unverified collections, conflict bookkeeping and capacity eviction
//! - [`MemoryPoolObserver`]: notifications on additions and removals
//!
//! The pool is shared behind an `Arc` and synchronizes internally. Mutations
//! are expected to come from the ledger actor only.

mod events;
mod memory_pool;
mod pool_item;
mod verification;
mod verification_context;

#[cfg(test)]
mod tests;

pub use events::{MemoryPoolObserver, TransactionRemovalReason};
pub use memory_pool::{MemoryPool, PoolCollaborators, ReverifyOutcome, DEFAULT_BLOCKS_TILL_REBROADCAST};
pub use pool_item::{PoolItem, PoolKey};
pub use verification::StateVerifier;
pub use verification_context::{BalanceProvider, TransactionVerificationContext};
