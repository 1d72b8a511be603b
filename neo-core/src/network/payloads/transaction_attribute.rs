use crate::io::{BinaryWriter, Serializable};
use neo_primitives::UInt256;
use serde::{Deserialize, Serialize};

/// Wire tag of a transaction attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionAttributeType {
    HighPriority = 0x01,
    OracleResponse = 0x11,
    NotValidBefore = 0x20,
    Conflicts = 0x21,
}

/// Typed attribute attached to a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionAttribute {
    /// Elevates pool ranking above every fee-based ordering.
    HighPriority,
    /// Carries the result of an oracle request; the id must be unique
    /// among pending transactions.
    OracleResponse { id: u64, code: u8, result: Vec<u8> },
    /// The transaction is not valid before the given height.
    NotValidBefore { height: u32 },
    /// The transaction invalidates the named one if persisted first.
    Conflicts { hash: UInt256 },
}

impl TransactionAttribute {
    pub fn attribute_type(&self) -> TransactionAttributeType {
        match self {
            Self::HighPriority => TransactionAttributeType::HighPriority,
            Self::OracleResponse { .. } => TransactionAttributeType::OracleResponse,
            Self::NotValidBefore { .. } => TransactionAttributeType::NotValidBefore,
            Self::Conflicts { .. } => TransactionAttributeType::Conflicts,
        }
    }

    /// Whether a transaction may carry more than one attribute of this type.
    pub fn allow_multiple(&self) -> bool {
        matches!(self, Self::Conflicts { .. })
    }
}

impl Serializable for TransactionAttribute {
    fn serialize(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.attribute_type() as u8);
        match self {
            Self::HighPriority => {}
            Self::OracleResponse { id, code, result } => {
                writer.write_u64(*id);
                writer.write_u8(*code);
                writer.write_var_bytes(result);
            }
            Self::NotValidBefore { height } => writer.write_u32(*height),
            Self::Conflicts { hash } => writer.write_bytes(hash.as_bytes()),
        }
    }
}
