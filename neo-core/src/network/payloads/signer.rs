use crate::io::{BinaryWriter, Serializable};
use neo_primitives::UInt160;
use serde::{Deserialize, Serialize};

/// Scope in which a signer's witness is valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum WitnessScope {
    /// Only pays fees, cannot authorize contract calls.
    None = 0x00,
    /// Valid for the entry script only.
    #[default]
    CalledByEntry = 0x01,
    /// Valid everywhere.
    Global = 0x80,
}

/// An account authorizing a transaction. The first signer is its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signer {
    pub account: UInt160,
    pub scopes: WitnessScope,
}

impl Signer {
    pub fn new(account: UInt160, scopes: WitnessScope) -> Self {
        Self { account, scopes }
    }
}

impl From<UInt160> for Signer {
    fn from(account: UInt160) -> Self {
        Self::new(account, WitnessScope::CalledByEntry)
    }
}

impl Serializable for Signer {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_bytes(self.account.as_bytes());
        writer.write_u8(self.scopes as u8);
    }
}
