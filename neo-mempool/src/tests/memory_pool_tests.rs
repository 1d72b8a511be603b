use crate::{MemoryPool, MemoryPoolObserver, PoolCollaborators, TransactionRemovalReason};
use neo_config::ProtocolSettings;
use neo_core::ledger::{HeaderCache, InventoryVerifier, LedgerProvider};
use neo_core::network::payloads::{
    Block, ExtensiblePayload, Header, Signer, Transaction, TransactionAttribute, Witness,
};
use neo_core::persistence::DataCache;
use neo_core::time_provider::ManualTimeSource;
use neo_primitives::{UInt160, UInt256, VerifyResult};
use num_bigint::BigInt;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

const HEIGHT: u32 = 10;

struct TestLedger {
    on_chain: Mutex<HashSet<UInt256>>,
}

impl LedgerProvider for TestLedger {
    fn current_index(&self, _snapshot: &DataCache) -> u32 {
        HEIGHT
    }

    fn current_hash(&self, _snapshot: &DataCache) -> UInt256 {
        UInt256::zero()
    }

    fn initialized(&self, _snapshot: &DataCache) -> bool {
        true
    }

    fn contains_transaction(&self, _snapshot: &DataCache, hash: &UInt256) -> bool {
        self.on_chain.lock().contains(hash)
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

    fn get_block_hash(&self, _snapshot: &DataCache, _index: u32) -> Option<UInt256> {
        None
    }

    fn get_block(&self, _snapshot: &DataCache, _hash: &UInt256) -> Option<Block> {
        None
    }
}

struct AcceptAll;

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
struct RecordingObserver {
    added: Mutex<Vec<UInt256>>,
    removed: Mutex<Vec<(UInt256, TransactionRemovalReason)>>,
}

impl MemoryPoolObserver for RecordingObserver {
    fn transaction_added(&self, tx: &Transaction) {
        self.added.lock().push(tx.hash());
    }

    fn transaction_removed(&self, txs: &[Transaction], reason: TransactionRemovalReason) {
        self.removed
            .lock()
            .extend(txs.iter().map(|tx| (tx.hash(), reason)));
    }
}

struct Fixture {
    pool: MemoryPool,
    header_cache: Arc<HeaderCache>,
    clock: Arc<ManualTimeSource>,
    observer: Arc<RecordingObserver>,
    snapshot: DataCache,
}

fn fixture(capacity: u32, balance: i64) -> Fixture {
    let settings = ProtocolSettings {
        memory_pool_max_transactions: capacity,
        ..ProtocolSettings::default()
    };
    let header_cache = Arc::new(HeaderCache::new());
    let clock = Arc::new(ManualTimeSource::new(1_700_000_000_000));
    let pool = MemoryPool::new(
        settings,
        PoolCollaborators {
            ledger: Arc::new(TestLedger {
                on_chain: Mutex::new(HashSet::new()),
            }),
            verifier: Arc::new(AcceptAll),
            header_cache: header_cache.clone(),
            balances: Arc::new(move |_: &DataCache, _: &UInt160| BigInt::from(balance)),
            time: clock.clone(),
        },
    );
    let observer = Arc::new(RecordingObserver::default());
    pool.subscribe(observer.clone());
    Fixture {
        pool,
        header_cache,
        clock,
        observer,
        snapshot: DataCache::default(),
    }
}

fn account(byte: u8) -> UInt160 {
    UInt160::from([byte; 20])
}

fn tx(sender: u8, nonce: u32, network_fee: i64) -> Transaction {
    Transaction {
        nonce,
        network_fee,
        valid_until_block: HEIGHT + 100,
        signers: vec![Signer::from(account(sender))],
        script: vec![0x40],
        witnesses: vec![Witness::default()],
        ..Transaction::default()
    }
}

fn conflicting(mut tx: Transaction, hashes: &[UInt256]) -> Transaction {
    tx.attributes
        .extend(hashes.iter().map(|hash| TransactionAttribute::Conflicts { hash: *hash }));
    tx
}

#[test]
fn capacity_evicts_lowest_ranked() {
    let f = fixture(10, i64::MAX);
    let txs: Vec<_> = (0..10).map(|i| tx(1, i, 100_000 + i64::from(i) * 1_000)).collect();
    for t in &txs {
        assert_eq!(f.pool.try_add(t, &f.snapshot), VerifyResult::Succeed);
    }
    assert_eq!(f.pool.count(), 10);

    let better = tx(1, 99, 1_000_000);
    assert_eq!(f.pool.try_add(&better, &f.snapshot), VerifyResult::Succeed);
    assert_eq!(f.pool.count(), 10);
    assert!(!f.pool.contains(&txs[0].hash()));
    assert!(f.pool.contains(&better.hash()));
    assert!(f
        .observer
        .removed
        .lock()
        .contains(&(txs[0].hash(), TransactionRemovalReason::CapacityExceeded)));
}

#[test]
fn lowest_newcomer_is_rejected_when_full() {
    let f = fixture(3, i64::MAX);
    for i in 0..3 {
        f.pool.try_add(&tx(1, i, 500_000), &f.snapshot);
    }
    let cheap = tx(1, 50, 1);
    assert!(!f.pool.can_transaction_fit_in_pool(&cheap));
    assert_eq!(f.pool.try_add(&cheap, &f.snapshot), VerifyResult::OutOfMemory);
    assert!(!f.pool.contains(&cheap.hash()));
    assert_eq!(f.pool.count(), 3);
    assert!(f.pool.can_transaction_fit_in_pool(&tx(1, 51, 5_000_000)));
}

#[test]
fn resubmission_is_already_in_pool() {
    let f = fixture(10, i64::MAX);
    let t = tx(1, 1, 1_000);
    assert_eq!(f.pool.try_add(&t, &f.snapshot), VerifyResult::Succeed);
    assert_eq!(f.pool.try_add(&t, &f.snapshot), VerifyResult::AlreadyInPool);
    f.pool.invalidate_all_transactions();
    assert_eq!(f.pool.try_add(&t, &f.snapshot), VerifyResult::AlreadyInPool);
}

#[test]
fn sender_spend_is_bounded_by_balance() {
    let f = fixture(100, 8);
    let mk = |nonce| Transaction {
        system_fee: 1,
        ..tx(1, nonce, 2)
    };
    assert_eq!(f.pool.try_add(&mk(1), &f.snapshot), VerifyResult::Succeed);
    assert_eq!(f.pool.try_add(&mk(2), &f.snapshot), VerifyResult::Succeed);
    assert_eq!(f.pool.try_add(&mk(3), &f.snapshot), VerifyResult::InsufficientFunds);
    assert_eq!(f.pool.count(), 2);
}

#[test]
fn expired_transactions_are_rejected() {
    let f = fixture(10, i64::MAX);
    let stale = Transaction {
        valid_until_block: HEIGHT,
        ..tx(1, 1, 1_000)
    };
    assert_eq!(f.pool.try_add(&stale, &f.snapshot), VerifyResult::Expired);
}

#[test]
fn conflicting_newcomer_must_outbid_and_share_signer() {
    let f = fixture(10, i64::MAX);
    let pooled = tx(1, 1, 1_000);
    assert_eq!(f.pool.try_add(&pooled, &f.snapshot), VerifyResult::Succeed);

    let cheap = conflicting(tx(1, 2, 1_000), &[pooled.hash()]);
    assert_eq!(f.pool.try_add(&cheap, &f.snapshot), VerifyResult::HasConflicts);

    let stranger = conflicting(tx(2, 3, 5_000), &[pooled.hash()]);
    assert_eq!(f.pool.try_add(&stranger, &f.snapshot), VerifyResult::HasConflicts);

    let replacement = conflicting(tx(1, 4, 5_000), &[pooled.hash()]);
    assert_eq!(f.pool.try_add(&replacement, &f.snapshot), VerifyResult::Succeed);
    assert!(!f.pool.contains(&pooled.hash()));
    assert!(f.pool.contains(&replacement.hash()));
    assert!(f
        .observer
        .removed
        .lock()
        .contains(&(pooled.hash(), TransactionRemovalReason::Conflict)));
}

#[test]
fn pooled_declaration_against_newcomer_is_honoured() {
    let f = fixture(10, i64::MAX);
    let target = tx(1, 1, 1_000);
    let declaring = conflicting(tx(1, 2, 2_000), &[target.hash()]);
    assert_eq!(f.pool.try_add(&declaring, &f.snapshot), VerifyResult::Succeed);

    // Same sender declared it: the target must pay more than the declaring fee.
    assert_eq!(f.pool.try_add(&target, &f.snapshot), VerifyResult::HasConflicts);
    let richer_target = tx(1, 1, 3_000);
    let declaring_rich = conflicting(tx(1, 3, 2_000), &[richer_target.hash()]);
    assert_eq!(f.pool.try_add(&declaring_rich, &f.snapshot), VerifyResult::Succeed);
    assert_eq!(f.pool.try_add(&richer_target, &f.snapshot), VerifyResult::Succeed);
    assert!(!f.pool.contains(&declaring_rich.hash()));
}

#[test]
fn sorted_verified_puts_high_priority_first() {
    let f = fixture(10, i64::MAX);
    let rich = tx(1, 1, 9_000_000);
    let mut priority = tx(1, 2, 1);
    priority.attributes.push(TransactionAttribute::HighPriority);
    let mid = tx(1, 3, 500_000);
    for t in [&mid, &priority, &rich] {
        assert_eq!(f.pool.try_add(t, &f.snapshot), VerifyResult::Succeed);
    }
    let order: Vec<_> = f.pool.sorted_verified().iter().map(Transaction::hash).collect();
    assert_eq!(order, vec![priority.hash(), rich.hash(), mid.hash()]);
}

#[test]
fn reverify_promotes_highest_ranked_first() {
    let f = fixture(100, i64::MAX);
    let txs: Vec<_> = (0..5).map(|i| tx(1, i, 1_000 * (i64::from(i) + 1))).collect();
    for t in &txs {
        f.pool.try_add(t, &f.snapshot);
    }
    f.pool.invalidate_all_transactions();
    assert_eq!(f.pool.verified_count(), 0);
    assert_eq!(f.pool.unverified_count(), 5);

    let outcome = f.pool.reverify_top_unverified_transactions_if_needed(2, &f.snapshot);
    assert!(outcome.more_pending);
    let verified: HashSet<_> = f.pool.sorted_verified().iter().map(Transaction::hash).collect();
    assert_eq!(verified, [txs[4].hash(), txs[3].hash()].into_iter().collect());

    let outcome = f.pool.reverify_top_unverified_transactions_if_needed(10, &f.snapshot);
    assert!(!outcome.more_pending);
    assert_eq!(f.pool.verified_count(), 5);
}

#[test]
fn reverify_waits_for_pending_headers() {
    let f = fixture(100, i64::MAX);
    f.pool.try_add(&tx(1, 1, 1_000), &f.snapshot);
    f.pool.invalidate_all_transactions();
    f.header_cache.push_back(Header {
        index: HEIGHT + 1,
        ..Header::default()
    });
    let outcome = f.pool.reverify_top_unverified_transactions_if_needed(10, &f.snapshot);
    assert!(!outcome.more_pending);
    assert_eq!(f.pool.unverified_count(), 1);
}

#[test]
fn reverify_rebroadcasts_stale_items() {
    let f = fixture(100, i64::MAX);
    let t = tx(1, 1, 1_000);
    f.pool.try_add(&t, &f.snapshot);

    f.pool.invalidate_all_transactions();
    let outcome = f.pool.reverify_top_unverified_transactions_if_needed(10, &f.snapshot);
    assert!(outcome.rebroadcast.is_empty());

    f.pool.invalidate_all_transactions();
    f.clock.advance_millis(15_000 * 10 + 1);
    let outcome = f.pool.reverify_top_unverified_transactions_if_needed(10, &f.snapshot);
    assert_eq!(outcome.rebroadcast, vec![t]);
}

#[test]
fn persisted_block_removes_included_and_conflicting() {
    let f = fixture(100, i64::MAX);
    let included = tx(1, 1, 1_000);
    let same_sender = tx(1, 2, 1_000);
    let other_sender = tx(2, 3, 1_000);
    let block_tx = conflicting(tx(1, 9, 1_000), &[same_sender.hash(), other_sender.hash()]);
    let declares_block_tx = conflicting(tx(3, 4, 1_000), &[block_tx.hash()]);
    for t in [&included, &same_sender, &other_sender, &declares_block_tx] {
        assert_eq!(f.pool.try_add(t, &f.snapshot), VerifyResult::Succeed);
    }

    let block = Block::new(
        Header {
            index: HEIGHT + 1,
            ..Header::default()
        },
        vec![included.clone(), block_tx],
    );
    f.pool.update_pool_for_block_persisted(&block, &f.snapshot);

    assert!(!f.pool.contains(&included.hash()));
    assert!(!f.pool.contains(&same_sender.hash()));
    assert!(!f.pool.contains(&declares_block_tx.hash()));
    assert!(f.pool.contains(&other_sender.hash()));
    // No pending headers: survivors are reverified immediately.
    assert_eq!(f.pool.verified_count(), 1);
    assert_eq!(f.pool.unverified_count(), 0);

    let removed = f.observer.removed.lock();
    assert!(removed.contains(&(same_sender.hash(), TransactionRemovalReason::Conflict)));
    assert!(removed.contains(&(declares_block_tx.hash(), TransactionRemovalReason::Conflict)));
}

#[test]
fn persisted_block_defers_reverify_while_headers_pending() {
    let f = fixture(100, i64::MAX);
    let t = tx(1, 1, 1_000);
    f.pool.try_add(&t, &f.snapshot);
    f.header_cache.push_back(Header {
        index: HEIGHT + 2,
        ..Header::default()
    });
    let block = Block::new(
        Header {
            index: HEIGHT + 1,
            ..Header::default()
        },
        vec![],
    );
    let outcome = f.pool.update_pool_for_block_persisted(&block, &f.snapshot);
    assert!(outcome.more_pending);
    assert_eq!(f.pool.verified_count(), 0);
    assert_eq!(f.pool.unverified_count(), 1);
}

#[test]
fn try_remove_unverified_only_touches_unverified() {
    let f = fixture(10, i64::MAX);
    let t = tx(1, 1, 1_000);
    f.pool.try_add(&t, &f.snapshot);
    assert!(f.pool.try_remove_unverified(&t.hash()).is_none());
    f.pool.invalidate_all_transactions();
    assert_eq!(f.pool.try_remove_unverified(&t.hash()), Some(t));
    assert_eq!(f.pool.count(), 0);
    assert_eq!(f.observer.added.lock().len(), 1);
}
