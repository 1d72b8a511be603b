//! Minimal ledger doubles for starting a [`LedgerSystem`] in tests.

#![allow(dead_code)]

use neo_ledger_gate::chain::{BlockchainContext, CommitHandler, Detached, HookError};
use neo_ledger_gate::config::ProtocolSettings;
use neo_ledger_gate::core::ledger::{InventoryVerifier, LedgerProvider};
use neo_ledger_gate::core::network::payloads::{Block, ExtensiblePayload, Header, Transaction};
use neo_ledger_gate::core::persistence::{DataCache, MemoryStore, StorageItem, StorageKey};
use neo_ledger_gate::core::smart_contract::{
    ApplicationExecuted, ExecutionEngine, ScriptExecutor, TriggerType, VmState,
};
use neo_ledger_gate::core::time_provider::ManualTimeSource;
use neo_ledger_gate::primitives::{UInt160, UInt256, VerifyResult};
use num_bigint::BigInt;
use parking_lot::Mutex;
use std::sync::Arc;

const LEDGER_ID: i32 = -4;
const PREFIX_BLOCK_HASH: u8 = 9;
const PREFIX_BLOCK: u8 = 5;
const PREFIX_CURRENT_BLOCK: u8 = 12;

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

/// Ledger contract over the records [`BlockRecorder`] writes.
pub struct BlockLedger;

impl LedgerProvider for BlockLedger {
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

    fn contains_transaction(&self, _snapshot: &DataCache, _hash: &UInt256) -> bool {
        false
    }

    fn contains_conflict_hash(
        &self,
        _snapshot: &DataCache,
        _hash: &UInt256,
        _signers: &[UInt160],
        _max_traceable_blocks: u32,
    ) -> bool {
        false
    }

    fn get_block_hash(&self, snapshot: &DataCache, index: u32) -> Option<UInt256> {
        read(snapshot, &key(PREFIX_BLOCK_HASH, &index.to_be_bytes()))
    }

    fn get_block(&self, snapshot: &DataCache, hash: &UInt256) -> Option<Block> {
        read(snapshot, &key(PREFIX_BLOCK, hash.as_bytes()))
    }
}

/// Executor that only records blocks and moves the tip.
pub struct BlockRecorder;

impl ScriptExecutor for BlockRecorder {
    fn create(
        &self,
        trigger: TriggerType,
        _container: Option<&Transaction>,
        snapshot: DataCache,
        block: &Block,
        _settings: &ProtocolSettings,
        _gas: i64,
    ) -> Box<dyn ExecutionEngine> {
        Box::new(RecordingEngine {
            trigger,
            snapshot,
            block: block.clone(),
            state: VmState::None,
        })
    }
}

struct RecordingEngine {
    trigger: TriggerType,
    snapshot: DataCache,
    block: Block,
    state: VmState,
}

impl ExecutionEngine for RecordingEngine {
    fn load_script(&mut self, _script: &[u8]) {}

    fn execute(&mut self) -> VmState {
        let hash = self.block.hash();
        let index = self.block.index();
        match self.trigger {
            TriggerType::OnPersist => {
                write(&self.snapshot, key(PREFIX_BLOCK, hash.as_bytes()), &self.block);
                write(&self.snapshot, key(PREFIX_BLOCK_HASH, &index.to_be_bytes()), &hash);
            }
            TriggerType::PostPersist => {
                write(&self.snapshot, key(PREFIX_CURRENT_BLOCK, &[]), &(hash, index));
            }
            TriggerType::Application => {}
        }
        self.state = VmState::Halt;
        self.state
    }

    fn state(&self) -> VmState {
        self.state
    }

    fn gas_consumed(&self) -> i64 {
        0
    }

    fn fault_exception(&self) -> Option<String> {
        None
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

/// Handler that fails every commit and records the heights it saw.
pub struct FailingHandler {
    pub seen: Mutex<Vec<u32>>,
}

impl FailingHandler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            seen: Mutex::new(Vec::new()),
        })
    }
}

impl CommitHandler for FailingHandler {
    fn name(&self) -> &str {
        "failing"
    }

    fn on_committing(
        &self,
        block: &Block,
        _snapshot: &DataCache,
        _executed: &[ApplicationExecuted],
    ) -> Result<(), HookError> {
        self.seen.lock().push(block.index());
        Err(HookError::Fault("index unavailable".into()))
    }
}

/// Context over `store` with detached network and sync.
pub fn context(store: Arc<MemoryStore>, genesis: Option<Block>) -> BlockchainContext {
    BlockchainContext {
        store,
        ledger: Arc::new(BlockLedger),
        verifier: Arc::new(AcceptAll),
        executor: Arc::new(BlockRecorder),
        network: Arc::new(Detached),
        sync: Arc::new(Detached),
        balances: Arc::new(|_: &DataCache, _: &UInt160| BigInt::from(100_000_000_000i64)),
        time: Arc::new(ManualTimeSource::new(1_700_000_000_000)),
        genesis,
    }
}

pub fn child_of(prev: &Header) -> Block {
    let mut block = Block::new(
        Header {
            prev_hash: prev.hash(),
            index: prev.index + 1,
            timestamp: prev.timestamp + 1_000,
            ..Header::default()
        },
        Vec::new(),
    );
    block.rebuild_merkle_root();
    block
}
