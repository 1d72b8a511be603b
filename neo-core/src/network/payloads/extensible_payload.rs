use super::Witness;
use crate::crypto::sha256;
use crate::io::{BinaryWriter, Serializable};
use crate::ledger::InventoryVerifier;
use crate::persistence::DataCache;
use neo_config::ProtocolSettings;
use neo_primitives::{UInt160, UInt256};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Category-tagged payload exchanged between consensus and service nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensiblePayload {
    pub category: String,
    /// First height at which the payload is valid (inclusive).
    pub valid_block_start: u32,
    /// Height at which the payload stops being valid (exclusive).
    pub valid_block_end: u32,
    pub sender: UInt160,
    pub data: Vec<u8>,
    pub witness: Witness,
}

impl ExtensiblePayload {
    pub fn hash(&self) -> UInt256 {
        let mut writer = BinaryWriter::new();
        self.serialize_unsigned(&mut writer);
        UInt256::from(sha256(writer.as_bytes()))
    }

    /// Checks the validity window, sender whitelist and witness.
    pub fn verify(
        &self,
        height: u32,
        whitelist: &HashSet<UInt160>,
        settings: &ProtocolSettings,
        snapshot: &DataCache,
        verifier: &dyn InventoryVerifier,
    ) -> bool {
        if height < self.valid_block_start || height >= self.valid_block_end {
            return false;
        }
        if !whitelist.contains(&self.sender) {
            return false;
        }
        verifier.verify_extensible_witness(self, settings, snapshot)
    }

    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_var_string(&self.category);
        writer.write_u32(self.valid_block_start);
        writer.write_u32(self.valid_block_end);
        writer.write_bytes(self.sender.as_bytes());
        writer.write_var_bytes(&self.data);
    }
}

impl Serializable for ExtensiblePayload {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        writer.write_var_int(1);
        Serializable::serialize(&self.witness, writer);
    }
}
