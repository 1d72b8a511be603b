use super::{Block, ExtensiblePayload, Transaction};
use neo_primitives::UInt256;
use serde::{Deserialize, Serialize};

/// Wire tag of an inventory item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum InventoryType {
    Transaction = 0x2b,
    Block = 0x2c,
    Extensible = 0x2e,
}

/// Any item the ledger can admit and the network can relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inventory {
    Transaction(Transaction),
    Block(Block),
    Extensible(ExtensiblePayload),
}

impl Inventory {
    pub fn hash(&self) -> UInt256 {
        match self {
            Self::Transaction(tx) => tx.hash(),
            Self::Block(block) => block.hash(),
            Self::Extensible(payload) => payload.hash(),
        }
    }

    pub fn inventory_type(&self) -> InventoryType {
        match self {
            Self::Transaction(_) => InventoryType::Transaction,
            Self::Block(_) => InventoryType::Block,
            Self::Extensible(_) => InventoryType::Extensible,
        }
    }
}

impl From<Transaction> for Inventory {
    fn from(tx: Transaction) -> Self {
        Self::Transaction(tx)
    }
}

impl From<Block> for Inventory {
    fn from(block: Block) -> Self {
        Self::Block(block)
    }
}

impl From<ExtensiblePayload> for Inventory {
    fn from(payload: ExtensiblePayload) -> Self {
        Self::Extensible(payload)
    }
}
