//! Ledger actor: the single writer of chain state.
//!
//! # Architecture
//!
//! ```text
//!   BlockchainHandle ──high──┐
//!   (headers, blocks,        │      ┌──────────────────────────────┐
//!    payloads, shutdown)     ├────► │ Blockchain task (one writer) │
//!   BlockchainHandle ─normal─┤      │  block cache / unverified    │
//!   (txs, import, fill)      │      │  header cache / memory pool  │
//!   TransactionRouter ───────┘      └──────────────┬───────────────┘
//!   (preverify results)                            │ broadcast
//!                                                  ▼
//!                                           BlockchainEvent
//! ```
//!
//! Every mutation of the block caches, the header cache and the memory pool
//! happens on the actor task. The header cache and memory pool are shared
//! behind `Arc` so other subsystems can read them concurrently.
//!
//! # Block Processing Flow
//!
//! 1. Blocks at or below the persisted height are rejected as known
//! 2. Blocks whose predecessor is unknown are buffered per height
//! 3. The next block is verified against its predecessor header
//! 4. Persistence runs OnPersist, every transaction, then PostPersist
//! 5. Extensions see the block before and after the snapshot commits
//! 6. Contiguous cached successors are persisted in the same pass

mod actor;
mod block_processing;
mod handle;
mod handlers;
mod messages;
mod persist;
mod unverified;

pub use handle::BlockchainHandle;
pub use messages::{
    BlockchainCommand, BlockchainEvent, FillMemoryPool, Import, PersistCompleted, RelayResult,
    Reply, Reverify,
};
pub(crate) use messages::respond;

use crate::collaborators::{NetworkChannel, SyncObserver};
use crate::error::ChainResult;
use crate::extensions::CommitHandlers;
use crate::transaction_router::TransactionRouter;
use neo_config::{LedgerSettings, ProtocolSettings};
use neo_core::ledger::{HeaderCache, InventoryVerifier, LedgerProvider};
use neo_core::network::payloads::Block;
use neo_core::persistence::{DataCache, Store};
use neo_core::smart_contract::ScriptExecutor;
use neo_core::time_provider::TimeSource;
use neo_mempool::{BalanceProvider, MemoryPool, PoolCollaborators};
use neo_primitives::{UInt160, UInt256};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use unverified::UnverifiedBlocksList;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// External systems the ledger actor is wired to.
pub struct BlockchainContext {
    pub store: Arc<dyn Store>,
    pub ledger: Arc<dyn LedgerProvider>,
    pub verifier: Arc<dyn InventoryVerifier>,
    pub executor: Arc<dyn ScriptExecutor>,
    pub network: Arc<dyn NetworkChannel>,
    pub sync: Arc<dyn SyncObserver>,
    pub balances: BalanceProvider,
    pub time: Arc<dyn TimeSource>,
    /// Block persisted on an empty store. [`Block::genesis`] when `None`.
    pub genesis: Option<Block>,
}

/// State owned by the ledger actor task.
pub struct Blockchain {
    settings: Arc<ProtocolSettings>,
    ledger_settings: LedgerSettings,
    store: Arc<dyn Store>,
    ledger: Arc<dyn LedgerProvider>,
    verifier: Arc<dyn InventoryVerifier>,
    executor: Arc<dyn ScriptExecutor>,
    network: Arc<dyn NetworkChannel>,
    sync: Arc<dyn SyncObserver>,
    header_cache: Arc<HeaderCache>,
    mempool: Arc<MemoryPool>,
    extensions: CommitHandlers,
    router: TransactionRouter,
    genesis: Block,
    events: broadcast::Sender<BlockchainEvent>,
    block_cache: HashMap<UInt256, Block>,
    block_cache_unverified: HashMap<u32, UnverifiedBlocksList>,
    extensible_witness_white_list: Option<HashSet<UInt160>>,
    /// Messages the actor sent to itself, handled before the normal mailbox.
    pending: VecDeque<BlockchainCommand>,
    idle_scheduled: bool,
}

impl Blockchain {
    /// Starts the actor on the current tokio runtime.
    ///
    /// The join handle resolves when the actor stops: `Ok` after a shutdown
    /// request or once every handle is dropped, `Err` on a fatal
    /// persistence failure.
    pub fn spawn(
        settings: ProtocolSettings,
        ledger_settings: LedgerSettings,
        context: BlockchainContext,
        extensions: CommitHandlers,
    ) -> (BlockchainHandle, JoinHandle<ChainResult<()>>) {
        let settings = Arc::new(settings);
        let (high_tx, high_rx) = mpsc::channel(ledger_settings.high_priority_capacity.max(1));
        let (normal_tx, normal_rx) = mpsc::channel(ledger_settings.normal_priority_capacity.max(1));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let header_cache = Arc::new(HeaderCache::new());
        let mempool = Arc::new(
            MemoryPool::new(
                settings.as_ref().clone(),
                PoolCollaborators {
                    ledger: Arc::clone(&context.ledger),
                    verifier: Arc::clone(&context.verifier),
                    header_cache: Arc::clone(&header_cache),
                    balances: context.balances,
                    time: context.time,
                },
            )
            .with_blocks_till_rebroadcast(ledger_settings.blocks_till_rebroadcast),
        );
        let router = TransactionRouter::new(
            Arc::clone(&settings),
            Arc::clone(&context.verifier),
            normal_tx.downgrade(),
        );
        let genesis = context
            .genesis
            .unwrap_or_else(|| Block::genesis(&settings));

        let handle = BlockchainHandle::new(
            high_tx,
            normal_tx,
            events.clone(),
            Arc::clone(&header_cache),
            Arc::clone(&mempool),
            Arc::clone(&context.ledger),
            Arc::clone(&context.store),
        );

        let actor = Self {
            settings,
            ledger_settings,
            store: context.store,
            ledger: context.ledger,
            verifier: context.verifier,
            executor: context.executor,
            network: context.network,
            sync: context.sync,
            header_cache,
            mempool,
            extensions,
            router,
            genesis,
            events,
            block_cache: HashMap::new(),
            block_cache_unverified: HashMap::new(),
            extensible_witness_white_list: None,
            pending: VecDeque::new(),
            idle_scheduled: false,
        };
        let task = tokio::spawn(actor.run(high_rx, normal_rx));
        (handle, task)
    }

    /// Fresh view over committed state.
    fn snapshot(&self) -> DataCache {
        DataCache::with_store(Arc::clone(&self.store))
    }

    fn header_height(&self, current_height: u32) -> u32 {
        self.header_cache
            .last()
            .map(|header| header.index())
            .unwrap_or(current_height)
    }

    fn publish(&self, event: BlockchainEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!(target: "neo", "no ledger event subscribers");
        }
    }
}
