use super::{Header, Transaction};
use crate::crypto::compute_merkle_root;
use crate::io::{BinaryWriter, Serializable};
use crate::ledger::InventoryVerifier;
use crate::persistence::DataCache;
use neo_config::ProtocolSettings;
use neo_primitives::{UInt256, GENESIS_NONCE, GENESIS_TIMESTAMP};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A header plus its ordered transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    /// The genesis block of a network with the given settings.
    pub fn genesis(_settings: &ProtocolSettings) -> Self {
        Self {
            header: Header {
                timestamp: GENESIS_TIMESTAMP,
                nonce: GENESIS_NONCE,
                ..Header::default()
            },
            transactions: Vec::new(),
        }
    }

    pub fn hash(&self) -> UInt256 {
        self.header.hash()
    }

    pub fn index(&self) -> u32 {
        self.header.index
    }

    pub fn prev_hash(&self) -> &UInt256 {
        &self.header.prev_hash
    }

    pub fn compute_merkle_root(&self) -> UInt256 {
        let hashes: Vec<UInt256> = self.transactions.iter().map(Transaction::hash).collect();
        compute_merkle_root(&hashes)
    }

    /// Sets the merkle root from the current transaction list.
    pub fn rebuild_merkle_root(&mut self) {
        self.header.merkle_root = self.compute_merkle_root();
    }

    /// Verifies the header against `prev`, the merkle root and transaction uniqueness.
    pub fn verify(
        &self,
        prev: &Header,
        settings: &ProtocolSettings,
        snapshot: &DataCache,
        verifier: &dyn InventoryVerifier,
    ) -> bool {
        if self.transactions.len() > settings.max_transactions_per_block as usize {
            return false;
        }
        let mut seen = HashSet::with_capacity(self.transactions.len());
        if !self.transactions.iter().all(|tx| seen.insert(tx.hash())) {
            return false;
        }
        if self.compute_merkle_root() != self.header.merkle_root {
            return false;
        }
        self.header.verify(prev, settings, snapshot, verifier)
    }
}

impl Serializable for Block {
    fn serialize(&self, writer: &mut BinaryWriter) {
        Serializable::serialize(&self.header, writer);
        writer.write_serializable_list(&self.transactions);
    }
}
