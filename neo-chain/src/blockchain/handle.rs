//
// handle.rs - Cloneable front door of the ledger actor
//

use super::*;
use crate::collaborators::PeerId;
use crate::error::ChainError;
use neo_core::network::payloads::{ExtensiblePayload, Header, Inventory, Transaction};
use neo_primitives::VerifyResult;
use tokio::sync::oneshot;

/// Sends requests to the ledger actor and reads the state it shares.
///
/// Every clone talks to the same actor. The actor stops once the last
/// handle is dropped or [`BlockchainHandle::shutdown`] is called.
#[derive(Clone)]
pub struct BlockchainHandle {
    high: mpsc::Sender<BlockchainCommand>,
    normal: mpsc::Sender<BlockchainCommand>,
    events: broadcast::Sender<BlockchainEvent>,
    header_cache: Arc<HeaderCache>,
    mempool: Arc<MemoryPool>,
    ledger: Arc<dyn LedgerProvider>,
    store: Arc<dyn Store>,
}

impl BlockchainHandle {
    pub(crate) fn new(
        high: mpsc::Sender<BlockchainCommand>,
        normal: mpsc::Sender<BlockchainCommand>,
        events: broadcast::Sender<BlockchainEvent>,
        header_cache: Arc<HeaderCache>,
        mempool: Arc<MemoryPool>,
        ledger: Arc<dyn LedgerProvider>,
        store: Arc<dyn Store>,
    ) -> Self {
        Self {
            high,
            normal,
            events,
            header_cache,
            mempool,
            ledger,
            store,
        }
    }

    async fn tell(&self, command: BlockchainCommand) -> ChainResult<()> {
        let mailbox = if command.is_high_priority() {
            &self.high
        } else {
            &self.normal
        };
        mailbox
            .send(command)
            .await
            .map_err(|_| ChainError::ActorStopped)
    }

    async fn ask<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> BlockchainCommand,
    ) -> ChainResult<T> {
        let (reply, answer) = oneshot::channel();
        self.tell(build(Some(reply))).await?;
        answer.await.map_err(|_| ChainError::ActorStopped)
    }

    /// Persists genesis on an empty store or checks the stored one.
    pub async fn initialize(&self) -> ChainResult<()> {
        self.ask(|reply| BlockchainCommand::Initialize { reply }).await?
    }

    /// Persists a contiguous run of trusted blocks.
    pub async fn import(&self, blocks: Vec<Block>, verify: bool) -> ChainResult<()> {
        self.ask(|reply| BlockchainCommand::Import {
            import: Import { blocks, verify },
            reply,
        })
        .await?
    }

    /// Returns how many headers were appended to the header cache.
    pub async fn submit_headers(&self, headers: Vec<Header>) -> ChainResult<usize> {
        self.ask(|reply| BlockchainCommand::Headers { headers, reply })
            .await
    }

    pub async fn submit_block(&self, block: Block) -> ChainResult<VerifyResult> {
        self.ask(|reply| BlockchainCommand::InventoryBlock {
            block,
            sender: None,
            reply,
        })
        .await?
    }

    /// Like [`submit_block`](Self::submit_block), remembering which peer sent it.
    pub async fn submit_block_from(&self, block: Block, peer: PeerId) -> ChainResult<VerifyResult> {
        self.ask(|reply| BlockchainCommand::InventoryBlock {
            block,
            sender: Some(peer),
            reply,
        })
        .await?
    }

    pub async fn submit_extensible(
        &self,
        payload: ExtensiblePayload,
        relay: bool,
    ) -> ChainResult<VerifyResult> {
        self.ask(|reply| BlockchainCommand::InventoryExtensible {
            payload,
            relay,
            reply,
        })
        .await
    }

    pub async fn submit_transaction(&self, transaction: Transaction) -> ChainResult<VerifyResult> {
        self.ask(|reply| BlockchainCommand::Transaction { transaction, reply })
            .await
    }

    pub async fn fill_memory_pool(&self, transactions: Vec<Transaction>) -> ChainResult<()> {
        self.ask(|reply| BlockchainCommand::FillMemoryPool {
            fill: FillMemoryPool { transactions },
            reply,
        })
        .await
    }

    /// Queues inventory for re-admission. Results arrive as events.
    pub async fn reverify(&self, inventories: Vec<Inventory>) -> ChainResult<()> {
        self.tell(BlockchainCommand::Reverify(Reverify { inventories }))
            .await
    }

    pub async fn shutdown(&self) -> ChainResult<()> {
        self.tell(BlockchainCommand::Shutdown).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BlockchainEvent> {
        self.events.subscribe()
    }

    pub fn mempool(&self) -> &Arc<MemoryPool> {
        &self.mempool
    }

    pub fn header_cache(&self) -> &Arc<HeaderCache> {
        &self.header_cache
    }

    /// Height of the last persisted block.
    pub fn current_height(&self) -> u32 {
        let snapshot = DataCache::with_store(Arc::clone(&self.store));
        self.ledger.current_index(&snapshot)
    }

    /// Height of the last known header, persisted or cached.
    pub fn header_height(&self) -> u32 {
        self.header_cache
            .last()
            .map(|header| header.index())
            .unwrap_or_else(|| self.current_height())
    }
}
