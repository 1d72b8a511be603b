//! Doubles shared by the ledger actor integration tests.

#![allow(dead_code)]

use neo_chain::{
    Blockchain, BlockchainContext, BlockchainEvent, BlockchainHandle, ChainResult, CommitHandlers,
    NetworkChannel, PeerId, SyncObserver,
};
use neo_config::{LedgerSettings, ProtocolSettings};
use neo_core::ledger::{InventoryVerifier, LedgerProvider};
use neo_core::network::payloads::{
    Block, ExtensiblePayload, Header, Inventory, Signer, Transaction, TransactionAttribute, Witness,
};
use neo_core::persistence::{DataCache, MemoryStore, StorageItem, StorageKey, Store};
use neo_core::smart_contract::{ExecutionEngine, ScriptExecutor, TriggerType, VmState};
use neo_core::time_provider::ManualTimeSource;
use neo_primitives::{UInt160, UInt256, VerifyResult};
use num_bigint::BigInt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const LEDGER_ID: i32 = -4;
const PREFIX_BLOCK_HASH: u8 = 9;
const PREFIX_BLOCK: u8 = 5;
const PREFIX_TRANSACTION: u8 = 11;
const PREFIX_CONFLICT: u8 = 13;
const PREFIX_CURRENT_BLOCK: u8 = 12;
const PREFIX_EXECUTED: u8 = 20;

pub const NETWORK: u32 = 0x4e45_4f54;

pub fn settings() -> ProtocolSettings {
    ProtocolSettings::private(NETWORK)
}

fn key(prefix: u8, suffix: &[u8]) -> StorageKey {
    StorageKey::with_prefix(LEDGER_ID, prefix, suffix)
}

fn read<T: serde::de::DeserializeOwned>(snapshot: &DataCache, key: &StorageKey) -> Option<T> {
    snapshot.get(key).and_then(|item| item.to_value().ok())
}

fn write<T: serde::Serialize>(snapshot: &DataCache, key: StorageKey, value: &T) {
    let item = StorageItem::from_value(value).expect("test records serialize");
    snapshot.update(key, item);
}

/// Ledger contract reading the records [`ScriptedExecutor`] writes.
#[derive(Default)]
pub struct TestLedger {
    pub whitelist: Mutex<HashSet<UInt160>>,
}

impl TestLedger {
    /// Whether the application script of `hash` left its marker behind.
    pub fn executed(&self, snapshot: &DataCache, hash: &UInt256) -> bool {
        snapshot.contains(&key(PREFIX_EXECUTED, hash.as_bytes()))
    }
}

impl LedgerProvider for TestLedger {
    fn current_index(&self, snapshot: &DataCache) -> u32 {
        read::<(UInt256, u32)>(snapshot, &key(PREFIX_CURRENT_BLOCK, &[]))
            .map(|(_, index)| index)
            .unwrap_or(0)
    }

    fn current_hash(&self, snapshot: &DataCache) -> UInt256 {
        read::<(UInt256, u32)>(snapshot, &key(PREFIX_CURRENT_BLOCK, &[]))
            .map(|(hash, _)| hash)
            .unwrap_or_default()
    }

    fn initialized(&self, snapshot: &DataCache) -> bool {
        snapshot.contains(&key(PREFIX_CURRENT_BLOCK, &[]))
    }

    fn contains_transaction(&self, snapshot: &DataCache, hash: &UInt256) -> bool {
        snapshot.contains(&key(PREFIX_TRANSACTION, hash.as_bytes()))
    }

    fn contains_conflict_hash(
        &self,
        snapshot: &DataCache,
        hash: &UInt256,
        signers: &[UInt160],
        max_traceable_blocks: u32,
    ) -> bool {
        let Some(records) = read::<Vec<(UInt160, u32)>>(snapshot, &key(PREFIX_CONFLICT, hash.as_bytes()))
        else {
            return false;
        };
        let height = self.current_index(snapshot);
        records.iter().any(|(account, index)| {
            height.saturating_sub(*index) < max_traceable_blocks && signers.contains(account)
        })
    }

    fn get_block_hash(&self, snapshot: &DataCache, index: u32) -> Option<UInt256> {
        read(snapshot, &key(PREFIX_BLOCK_HASH, &index.to_be_bytes()))
    }

    fn get_block(&self, snapshot: &DataCache, hash: &UInt256) -> Option<Block> {
        read(snapshot, &key(PREFIX_BLOCK, hash.as_bytes()))
    }

    fn extensible_witness_whitelist(&self, _snapshot: &DataCache) -> HashSet<UInt160> {
        self.whitelist.lock().clone()
    }
}

/// Faults injected into the next engine runs.
#[derive(Default)]
pub struct ExecutionPlan {
    pub fault_on_persist: AtomicBool,
    pub fault_post_persist: AtomicBool,
    pub faulting_transactions: Mutex<HashSet<UInt256>>,
}

/// Executor standing in for the native contracts.
///
/// OnPersist records the block and its transactions, each application run
/// leaves a marker, PostPersist moves the current block pointer.
pub struct ScriptedExecutor {
    pub plan: Arc<ExecutionPlan>,
}

impl ScriptExecutor for ScriptedExecutor {
    fn create(
        &self,
        trigger: TriggerType,
        container: Option<&Transaction>,
        snapshot: DataCache,
        block: &Block,
        _settings: &ProtocolSettings,
        _gas: i64,
    ) -> Box<dyn ExecutionEngine> {
        Box::new(ScriptedEngine {
            trigger,
            container: container.cloned(),
            snapshot,
            block: block.clone(),
            plan: Arc::clone(&self.plan),
            state: VmState::None,
            exception: None,
        })
    }
}

struct ScriptedEngine {
    trigger: TriggerType,
    container: Option<Transaction>,
    snapshot: DataCache,
    block: Block,
    plan: Arc<ExecutionPlan>,
    state: VmState,
    exception: Option<String>,
}

impl ScriptedEngine {
    fn fault(&mut self, reason: &str) -> VmState {
        self.exception = Some(reason.to_string());
        self.state = VmState::Fault;
        self.state
    }

    fn on_persist(&self) {
        let hash = self.block.hash();
        let index = self.block.index();
        write(&self.snapshot, key(PREFIX_BLOCK, hash.as_bytes()), &self.block);
        write(&self.snapshot, key(PREFIX_BLOCK_HASH, &index.to_be_bytes()), &hash);
        for tx in &self.block.transactions {
            write(&self.snapshot, key(PREFIX_TRANSACTION, tx.hash().as_bytes()), &index);
            for conflict in tx.conflicts() {
                let conflict_key = key(PREFIX_CONFLICT, conflict.as_bytes());
                let mut records: Vec<(UInt160, u32)> =
                    read(&self.snapshot, &conflict_key).unwrap_or_default();
                records.extend(tx.signer_accounts().into_iter().map(|account| (account, index)));
                write(&self.snapshot, conflict_key, &records);
            }
        }
    }
}

impl ExecutionEngine for ScriptedEngine {
    fn load_script(&mut self, _script: &[u8]) {}

    fn execute(&mut self) -> VmState {
        match self.trigger {
            TriggerType::OnPersist => {
                if self.plan.fault_on_persist.load(Ordering::SeqCst) {
                    return self.fault("OnPersist aborted");
                }
                self.on_persist();
            }
            TriggerType::Application => {
                let Some(tx) = self.container.clone() else {
                    return self.fault("no container");
                };
                let hash = tx.hash();
                write(&self.snapshot, key(PREFIX_EXECUTED, hash.as_bytes()), &true);
                if self.plan.faulting_transactions.lock().contains(&hash) {
                    return self.fault("ASSERT is executed with false result.");
                }
            }
            TriggerType::PostPersist => {
                if self.plan.fault_post_persist.load(Ordering::SeqCst) {
                    return self.fault("gas exhausted");
                }
                write(
                    &self.snapshot,
                    key(PREFIX_CURRENT_BLOCK, &[]),
                    &(self.block.hash(), self.block.index()),
                );
            }
        }
        self.state = VmState::Halt;
        self.state
    }

    fn state(&self) -> VmState {
        self.state
    }

    fn gas_consumed(&self) -> i64 {
        match self.trigger {
            TriggerType::Application => 1_000,
            _ => 0,
        }
    }

    fn fault_exception(&self) -> Option<String> {
        self.exception.clone()
    }

    fn snapshot(&self) -> &DataCache {
        &self.snapshot
    }
}

pub struct AcceptAll;

impl InventoryVerifier for AcceptAll {
    fn verify_state_dependent(
        &self,
        _tx: &Transaction,
        _settings: &ProtocolSettings,
        _snapshot: &DataCache,
    ) -> VerifyResult {
        VerifyResult::Succeed
    }

    fn verify_header_witness(
        &self,
        _header: &Header,
        _settings: &ProtocolSettings,
        _snapshot: &DataCache,
    ) -> bool {
        true
    }

    fn verify_extensible_witness(
        &self,
        _payload: &ExtensiblePayload,
        _settings: &ProtocolSettings,
        _snapshot: &DataCache,
    ) -> bool {
        true
    }
}

#[derive(Default)]
pub struct RecordingNetwork {
    pub relayed: Mutex<Vec<Inventory>>,
    pub aborted: Mutex<Vec<PeerId>>,
}

impl RecordingNetwork {
    pub fn relayed_hashes(&self) -> Vec<UInt256> {
        self.relayed.lock().iter().map(Inventory::hash).collect()
    }
}

impl NetworkChannel for RecordingNetwork {
    fn relay_directly(&self, inventory: Inventory) {
        self.relayed.lock().push(inventory);
    }

    fn abort_peer(&self, peer: PeerId) {
        self.aborted.lock().push(peer);
    }
}

#[derive(Default)]
pub struct RecordingSync {
    pub batches: Mutex<Vec<Vec<u32>>>,
}

impl SyncObserver for RecordingSync {
    fn on_headers(&self, headers: &[Header]) {
        self.batches
            .lock()
            .push(headers.iter().map(Header::index).collect());
    }
}

/// A running ledger actor with every double it talks to.
pub struct TestNode {
    pub handle: BlockchainHandle,
    pub task: JoinHandle<ChainResult<()>>,
    pub store: Arc<MemoryStore>,
    pub ledger: Arc<TestLedger>,
    pub plan: Arc<ExecutionPlan>,
    pub network: Arc<RecordingNetwork>,
    pub sync: Arc<RecordingSync>,
    pub settings: ProtocolSettings,
}

impl TestNode {
    pub fn start() -> Self {
        Self::start_with(LedgerSettings::default(), CommitHandlers::default())
    }

    pub fn start_with(ledger_settings: LedgerSettings, extensions: CommitHandlers) -> Self {
        Self::start_on(Arc::new(MemoryStore::new()), None, ledger_settings, extensions)
    }

    /// Spawns an actor over an existing store.
    pub fn start_on(
        store: Arc<MemoryStore>,
        genesis: Option<Block>,
        ledger_settings: LedgerSettings,
        extensions: CommitHandlers,
    ) -> Self {
        let settings = settings();
        let ledger = Arc::new(TestLedger::default());
        let plan = Arc::new(ExecutionPlan::default());
        let network = Arc::new(RecordingNetwork::default());
        let sync = Arc::new(RecordingSync::default());
        let context = BlockchainContext {
            store: store.clone(),
            ledger: ledger.clone(),
            verifier: Arc::new(AcceptAll),
            executor: Arc::new(ScriptedExecutor { plan: plan.clone() }),
            network: network.clone(),
            sync: sync.clone(),
            balances: Arc::new(|_: &DataCache, _: &UInt160| BigInt::from(100_000_000_000i64)),
            time: Arc::new(ManualTimeSource::new(1_700_000_000_000)),
            genesis,
        };
        let (handle, task) = Blockchain::spawn(settings.clone(), ledger_settings, context, extensions);
        Self {
            handle,
            task,
            store,
            ledger,
            plan,
            network,
            sync,
            settings,
        }
    }

    /// Starts a node and persists genesis.
    pub async fn initialized() -> Self {
        let node = Self::start();
        node.handle.initialize().await.expect("genesis persists");
        node
    }

    pub fn snapshot(&self) -> DataCache {
        DataCache::with_store(self.store.clone() as Arc<dyn Store>)
    }

    pub fn genesis(&self) -> Block {
        Block::genesis(&self.settings)
    }

    /// Builds `count` blocks on top of the persisted tip, without submitting them.
    pub fn chain_on_tip(&self, count: usize) -> Vec<Block> {
        let snapshot = self.snapshot();
        let tip = self
            .ledger
            .get_block(&snapshot, &self.ledger.current_hash(&snapshot))
            .map(|block| block.header)
            .unwrap_or_else(|| self.genesis().header);
        chain_from(&tip, count)
    }
}

pub fn account(byte: u8) -> UInt160 {
    UInt160::from([byte; 20])
}

pub fn tx(sender: u8, nonce: u32) -> Transaction {
    Transaction {
        nonce,
        network_fee: 100_000,
        system_fee: 1_000,
        valid_until_block: 1_000,
        signers: vec![Signer::from(account(sender))],
        script: vec![0x40],
        witnesses: vec![Witness::default()],
        ..Transaction::default()
    }
}

pub fn with_conflicts(mut tx: Transaction, hashes: &[UInt256]) -> Transaction {
    tx.attributes
        .extend(hashes.iter().map(|hash| TransactionAttribute::Conflicts { hash: *hash }));
    tx
}

pub fn child_of(prev: &Header, transactions: Vec<Transaction>) -> Block {
    let mut block = Block::new(
        Header {
            prev_hash: prev.hash(),
            index: prev.index + 1,
            timestamp: prev.timestamp + 1_000,
            ..Header::default()
        },
        transactions,
    );
    block.rebuild_merkle_root();
    block
}

pub fn chain_from(prev: &Header, count: usize) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(count);
    let mut prev = prev.clone();
    for _ in 0..count {
        let block = child_of(&prev, Vec::new());
        prev = block.header.clone();
        blocks.push(block);
    }
    blocks
}

/// Collects events until `done` matches one, or panics after a second.
pub async fn wait_for<F>(events: &mut broadcast::Receiver<BlockchainEvent>, mut done: F) -> Vec<BlockchainEvent>
where
    F: FnMut(&BlockchainEvent) -> bool,
{
    let mut seen = Vec::new();
    let deadline = tokio::time::sleep(Duration::from_secs(1));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            event = events.recv() => {
                let event = event.expect("event channel open");
                let finished = done(&event);
                seen.push(event);
                if finished {
                    return seen;
                }
            }
            _ = &mut deadline => panic!("timed out waiting for ledger event; saw {seen:?}"),
        }
    }
}
