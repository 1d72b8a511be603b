//! Requests accepted by the ledger actor and the events it publishes.

use crate::collaborators::PeerId;
use crate::error::ChainResult;
use crate::transaction_router::PreverifyCompleted;
use neo_core::network::payloads::{Block, ExtensiblePayload, Header, Inventory, InventoryType, Transaction};
use neo_core::smart_contract::ApplicationExecuted;
use neo_primitives::{UInt256, VerifyResult};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// One-shot answer channel of an ask. `None` for fire-and-forget messages.
pub type Reply<T> = Option<oneshot::Sender<T>>;

/// Answers an ask if the asker is still waiting.
pub(crate) fn respond<T>(reply: Reply<T>, value: T) {
    if let Some(sender) = reply {
        if sender.send(value).is_err() {
            tracing::trace!(target: "neo", "asker dropped before the ledger replied");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistCompleted {
    pub block: Block,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Import {
    pub blocks: Vec<Block>,
    pub verify: bool,
}

impl Default for Import {
    fn default() -> Self {
        Self {
            blocks: Vec::new(),
            verify: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillMemoryPool {
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reverify {
    pub inventories: Vec<Inventory>,
}

/// Outcome of admitting one inventory item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResult {
    pub inventory: Inventory,
    pub result: VerifyResult,
}

impl RelayResult {
    pub fn hash(&self) -> UInt256 {
        self.inventory.hash()
    }

    pub fn inventory_type(&self) -> InventoryType {
        self.inventory.inventory_type()
    }

    /// Height of the item when it is a block.
    pub fn block_index(&self) -> Option<u32> {
        match &self.inventory {
            Inventory::Block(block) => Some(block.index()),
            _ => None,
        }
    }
}

/// Everything the ledger actor announces, on one broadcast channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainEvent {
    PersistCompleted(PersistCompleted),
    RelayResult(RelayResult),
    ImportCompleted,
    FillCompleted,
    ApplicationExecuted(ApplicationExecuted),
}

/// Mailbox message of the ledger actor.
#[derive(Debug)]
pub enum BlockchainCommand {
    Initialize {
        reply: Reply<ChainResult<()>>,
    },
    Import {
        import: Import,
        reply: Reply<ChainResult<()>>,
    },
    FillMemoryPool {
        fill: FillMemoryPool,
        reply: Reply<()>,
    },
    Reverify(Reverify),
    Headers {
        headers: Vec<Header>,
        reply: Reply<usize>,
    },
    InventoryBlock {
        block: Block,
        sender: Option<PeerId>,
        reply: Reply<ChainResult<VerifyResult>>,
    },
    InventoryExtensible {
        payload: ExtensiblePayload,
        relay: bool,
        reply: Reply<VerifyResult>,
    },
    Transaction {
        transaction: Transaction,
        reply: Reply<VerifyResult>,
    },
    PreverifyCompleted(PreverifyCompleted),
    Idle,
    Shutdown,
}

impl BlockchainCommand {
    /// Headers, blocks, extensible payloads and shutdown jump the queue.
    pub fn is_high_priority(&self) -> bool {
        matches!(
            self,
            Self::Headers { .. }
                | Self::InventoryBlock { .. }
                | Self::InventoryExtensible { .. }
                | Self::Shutdown
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImportDisposition {
    AlreadySeen,
    NextExpected,
    FutureGap,
}

pub(crate) fn classify_import_block(current_height: u32, block_index: u32) -> ImportDisposition {
    if block_index <= current_height {
        ImportDisposition::AlreadySeen
    } else if block_index == current_height.saturating_add(1) {
        ImportDisposition::NextExpected
    } else {
        ImportDisposition::FutureGap
    }
}

pub(crate) fn should_schedule_reverify_idle(more_pending: bool, header_backlog: bool) -> bool {
    more_pending && !header_backlog
}
