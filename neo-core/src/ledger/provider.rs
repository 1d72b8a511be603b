use crate::network::payloads::{Block, Header};
use crate::persistence::DataCache;
use neo_primitives::{UInt160, UInt256};
use std::collections::HashSet;

/// Read surface of the native ledger contract.
///
/// Every query runs against the snapshot passed in, so callers decide whether
/// they see committed state or a working copy.
pub trait LedgerProvider: Send + Sync {
    /// Height of the last persisted block. Zero on an empty ledger.
    fn current_index(&self, snapshot: &DataCache) -> u32;

    fn current_hash(&self, snapshot: &DataCache) -> UInt256;

    /// True once the genesis block has been persisted.
    fn initialized(&self, snapshot: &DataCache) -> bool;

    fn contains_transaction(&self, snapshot: &DataCache, hash: &UInt256) -> bool;

    /// True if a persisted transaction within `max_traceable_blocks` declared
    /// `hash` as conflicting and shares a signer with `signers`.
    fn contains_conflict_hash(
        &self,
        snapshot: &DataCache,
        hash: &UInt256,
        signers: &[UInt160],
        max_traceable_blocks: u32,
    ) -> bool;

    fn get_block_hash(&self, snapshot: &DataCache, index: u32) -> Option<UInt256>;

    fn get_block(&self, snapshot: &DataCache, hash: &UInt256) -> Option<Block>;

    fn get_header(&self, snapshot: &DataCache, index: u32) -> Option<Header> {
        let hash = self.get_block_hash(snapshot, index)?;
        self.get_block(snapshot, &hash).map(|block| block.header)
    }

    /// Accounts allowed to send extensible payloads at the current height.
    fn extensible_witness_whitelist(&self, _snapshot: &DataCache) -> HashSet<UInt160> {
        HashSet::new()
    }
}
