use super::Witness;
use crate::crypto::sha256;
use crate::io::{BinaryWriter, Serializable};
use crate::ledger::InventoryVerifier;
use crate::persistence::DataCache;
use neo_config::ProtocolSettings;
use neo_primitives::{UInt160, UInt256};
use serde::{Deserialize, Serialize};

/// Block metadata without the transaction bodies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub version: u32,
    pub prev_hash: UInt256,
    pub merkle_root: UInt256,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub nonce: u64,
    pub index: u32,
    pub primary_index: u8,
    pub next_consensus: UInt160,
    pub witness: Witness,
}

impl Header {
    pub fn hash(&self) -> UInt256 {
        let mut writer = BinaryWriter::new();
        self.serialize_unsigned(&mut writer);
        UInt256::from(sha256(writer.as_bytes()))
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// Verifies this header as the direct successor of `prev`.
    pub fn verify(
        &self,
        prev: &Header,
        settings: &ProtocolSettings,
        snapshot: &DataCache,
        verifier: &dyn InventoryVerifier,
    ) -> bool {
        if u32::from(self.primary_index) >= settings.validators_count {
            return false;
        }
        if self.prev_hash != prev.hash() {
            return false;
        }
        if prev.index.checked_add(1) != Some(self.index) {
            return false;
        }
        if prev.timestamp >= self.timestamp {
            return false;
        }
        verifier.verify_header_witness(self, settings, snapshot)
    }

    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u32(self.version);
        writer.write_bytes(self.prev_hash.as_bytes());
        writer.write_bytes(self.merkle_root.as_bytes());
        writer.write_u64(self.timestamp);
        writer.write_u64(self.nonce);
        writer.write_u32(self.index);
        writer.write_u8(self.primary_index);
        writer.write_bytes(self.next_consensus.as_bytes());
    }
}

impl Serializable for Header {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        // Witness list of exactly one element.
        writer.write_var_int(1);
        Serializable::serialize(&self.witness, writer);
    }
}
