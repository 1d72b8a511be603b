//! Fee-ranked, capacity-bounded pool of pending transactions.

use crate::verification::StateVerifier;
use crate::{
    BalanceProvider, MemoryPoolObserver, PoolItem, PoolKey, TransactionRemovalReason,
    TransactionVerificationContext,
};
use chrono::{DateTime, Duration, Utc};
use neo_config::ProtocolSettings;
use neo_core::ledger::{HeaderCache, InventoryVerifier, LedgerProvider};
use neo_core::network::payloads::{Block, Transaction};
use neo_core::persistence::DataCache;
use neo_core::time_provider::TimeSource;
use neo_primitives::{UInt160, UInt256, VerifyResult};
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Default number of block intervals before a pooled transaction is re-broadcast.
pub const DEFAULT_BLOCKS_TILL_REBROADCAST: u32 = 10;

/// Ledger-side collaborators consulted by the pool.
#[derive(Clone)]
pub struct PoolCollaborators {
    pub ledger: Arc<dyn LedgerProvider>,
    pub verifier: Arc<dyn InventoryVerifier>,
    pub header_cache: Arc<HeaderCache>,
    pub balances: BalanceProvider,
    pub time: Arc<dyn TimeSource>,
}

/// Side effects of a re-verification pass that the ledger actor acts on.
#[derive(Debug, Default)]
pub struct ReverifyOutcome {
    /// Unverified transactions remain after this pass.
    pub more_pending: bool,
    /// Promoted transactions whose last broadcast is old enough to relay again.
    pub rebroadcast: Vec<Transaction>,
    /// Verified transactions displaced by a promoted conflicting one.
    pub displaced: Vec<Transaction>,
}

#[derive(Debug, Default)]
struct PoolState {
    verified: HashMap<UInt256, PoolItem>,
    sorted_verified: BTreeSet<PoolKey>,
    unverified: HashMap<UInt256, PoolItem>,
    sorted_unverified: BTreeSet<PoolKey>,
    /// Conflicted hash -> verified transactions declaring it.
    conflicts: HashMap<UInt256, HashSet<UInt256>>,
}

impl PoolState {
    fn len(&self) -> usize {
        self.verified.len() + self.unverified.len()
    }

    fn contains(&self, hash: &UInt256) -> bool {
        self.verified.contains_key(hash) || self.unverified.contains_key(hash)
    }

    fn insert_verified(&mut self, item: PoolItem) {
        self.sorted_verified.insert(item.key());
        for conflict in item.tx().conflicts() {
            self.conflicts
                .entry(*conflict)
                .or_default()
                .insert(item.hash());
        }
        self.verified.insert(item.hash(), item);
    }

    fn insert_unverified(&mut self, item: PoolItem) {
        self.sorted_unverified.insert(item.key());
        self.unverified.insert(item.hash(), item);
    }

    fn remove_verified(&mut self, hash: &UInt256) -> Option<PoolItem> {
        let item = self.verified.remove(hash)?;
        self.sorted_verified.remove(&item.key());
        for conflict in item.tx().conflicts() {
            if let Some(declaring) = self.conflicts.get_mut(conflict) {
                declaring.remove(hash);
                if declaring.is_empty() {
                    self.conflicts.remove(conflict);
                }
            }
        }
        Some(item)
    }

    fn remove_unverified(&mut self, hash: &UInt256) -> Option<PoolItem> {
        let item = self.unverified.remove(hash)?;
        self.sorted_unverified.remove(&item.key());
        Some(item)
    }

    /// Lowest ranked item across both collections. Ties evict the unverified one.
    fn lowest(&self) -> Option<(PoolKey, bool)> {
        match (self.sorted_verified.first(), self.sorted_unverified.first()) {
            (Some(v), Some(u)) if v < u => Some((*v, true)),
            (_, Some(u)) => Some((*u, false)),
            (Some(v), None) => Some((*v, true)),
            (None, None) => None,
        }
    }

    /// Pooled verified transactions `tx` would displace, or `None` if `tx` may not
    /// replace them.
    fn check_conflicts(&self, tx: &Transaction, hash: &UInt256) -> Option<Vec<UInt256>> {
        let sender = tx.sender();
        let signers: HashSet<UInt160> = tx.signer_accounts().into_iter().collect();
        let mut displaced = Vec::new();
        let mut seen = HashSet::new();
        let mut conflicts_fee: i64 = 0;

        // Pooled transactions that declared `tx` as conflicting.
        if let Some(declaring) = self.conflicts.get(hash) {
            for pooled in declaring {
                let Some(item) = self.verified.get(pooled) else {
                    continue;
                };
                if item.tx().signers.iter().any(|s| s.account == sender) {
                    conflicts_fee = conflicts_fee.saturating_add(item.tx().network_fee);
                }
                if seen.insert(*pooled) {
                    displaced.push(*pooled);
                }
            }
        }

        // Pooled transactions `tx` declares as conflicting.
        for conflict in tx.conflicts() {
            let Some(item) = self.verified.get(conflict) else {
                continue;
            };
            if !item.tx().signers.iter().any(|s| signers.contains(&s.account)) {
                return None;
            }
            conflicts_fee = conflicts_fee.saturating_add(item.tx().network_fee);
            if seen.insert(*conflict) {
                displaced.push(*conflict);
            }
        }

        if conflicts_fee != 0 && conflicts_fee >= tx.network_fee {
            return None;
        }
        Some(displaced)
    }

    fn transactions_of(&self, hashes: &[UInt256]) -> Vec<Transaction> {
        hashes
            .iter()
            .filter_map(|hash| self.verified.get(hash).map(|item| item.tx().clone()))
            .collect()
    }
}

/// The transaction memory pool.
///
/// Verified transactions have passed state-dependent checks against the
/// current tip and are candidates for the next block. Unverified ones must be
/// re-checked before they can be proposed again.
pub struct MemoryPool {
    settings: ProtocolSettings,
    capacity: usize,
    blocks_till_rebroadcast: u32,
    ledger: Arc<dyn LedgerProvider>,
    verifier: Arc<dyn InventoryVerifier>,
    header_cache: Arc<HeaderCache>,
    time: Arc<dyn TimeSource>,
    state: RwLock<PoolState>,
    context: RwLock<TransactionVerificationContext>,
    observers: RwLock<Vec<Arc<dyn MemoryPoolObserver>>>,
}

impl MemoryPool {
    pub fn new(settings: ProtocolSettings, collaborators: PoolCollaborators) -> Self {
        Self {
            capacity: settings.memory_pool_max_transactions as usize,
            settings,
            blocks_till_rebroadcast: DEFAULT_BLOCKS_TILL_REBROADCAST,
            ledger: collaborators.ledger,
            verifier: collaborators.verifier,
            header_cache: collaborators.header_cache,
            time: collaborators.time,
            state: RwLock::new(PoolState::default()),
            context: RwLock::new(TransactionVerificationContext::new(collaborators.balances)),
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn with_blocks_till_rebroadcast(mut self, blocks: u32) -> Self {
        self.blocks_till_rebroadcast = blocks;
        self
    }

    pub fn subscribe(&self, observer: Arc<dyn MemoryPoolObserver>) {
        self.observers.write().push(observer);
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn count(&self) -> usize {
        self.state.read().len()
    }

    pub fn verified_count(&self) -> usize {
        self.state.read().verified.len()
    }

    pub fn unverified_count(&self) -> usize {
        self.state.read().unverified.len()
    }

    pub fn contains(&self, hash: &UInt256) -> bool {
        self.state.read().contains(hash)
    }

    pub fn try_get(&self, hash: &UInt256) -> Option<Transaction> {
        let state = self.state.read();
        state
            .verified
            .get(hash)
            .or_else(|| state.unverified.get(hash))
            .map(|item| item.tx().clone())
    }

    /// Verified transactions, highest ranked first.
    pub fn sorted_verified(&self) -> Vec<Transaction> {
        let state = self.state.read();
        state
            .sorted_verified
            .iter()
            .rev()
            .filter_map(|key| state.verified.get(&key.hash))
            .map(|item| item.tx().clone())
            .collect()
    }

    /// Both collections, each highest ranked first.
    pub fn verified_and_unverified(&self) -> (Vec<Transaction>, Vec<Transaction>) {
        let state = self.state.read();
        let collect = |sorted: &BTreeSet<PoolKey>, items: &HashMap<UInt256, PoolItem>| {
            sorted
                .iter()
                .rev()
                .filter_map(|key| items.get(&key.hash))
                .map(|item| item.tx().clone())
                .collect::<Vec<_>>()
        };
        (
            collect(&state.sorted_verified, &state.verified),
            collect(&state.sorted_unverified, &state.unverified),
        )
    }

    /// Whether `tx` would rank at least as high as the current lowest item.
    pub fn can_transaction_fit_in_pool(&self, tx: &Transaction) -> bool {
        let state = self.state.read();
        if state.len() < self.capacity {
            return true;
        }
        match state.lowest() {
            Some((lowest, _)) => lowest <= PoolKey::of(tx),
            None => true,
        }
    }

    /// Verifies `tx` against `snapshot` and admits it as verified.
    pub fn try_add(&self, tx: &Transaction, snapshot: &DataCache) -> VerifyResult {
        let hash = tx.hash();
        let now = self.time.utc_now();
        let (displaced, evicted) = {
            let mut state = self.state.write();
            if state.contains(&hash) {
                return VerifyResult::AlreadyInPool;
            }
            let Some(conflicts) = state.check_conflicts(tx, &hash) else {
                return VerifyResult::HasConflicts;
            };
            let conflicting_txs = state.transactions_of(&conflicts);

            let mut context = self.context.write();
            let result = self
                .state_verifier()
                .verify(tx, snapshot, &context, &conflicting_txs);
            if !result.is_success() {
                return result;
            }

            state.insert_verified(PoolItem::new(tx.clone(), now));
            context.add_transaction(tx);
            for conflict in &conflicts {
                if let Some(item) = state.remove_verified(conflict) {
                    context.remove_transaction(item.tx());
                }
            }
            let evicted = self.remove_over_capacity(&mut state, &mut context);
            (conflicting_txs, evicted)
        };

        debug!(target: "neo", hash = %hash, displaced = displaced.len(), evicted = evicted.len(), "transaction added to pool");
        self.notify_added(tx);
        self.notify_removed(&displaced, TransactionRemovalReason::Conflict);
        self.notify_removed(&evicted, TransactionRemovalReason::CapacityExceeded);

        if evicted.iter().any(|evicted| evicted.hash() == hash) {
            return VerifyResult::OutOfMemory;
        }
        VerifyResult::Succeed
    }

    pub fn try_remove_unverified(&self, hash: &UInt256) -> Option<Transaction> {
        self.state
            .write()
            .remove_unverified(hash)
            .map(PoolItem::into_tx)
    }

    /// Moves every verified transaction back to the unverified collection.
    pub fn invalidate_verified_transactions(&self) {
        let mut state = self.state.write();
        self.invalidate_locked(&mut state);
    }

    /// Alias kept for callers refilling the pool wholesale.
    pub fn invalidate_all_transactions(&self) {
        self.invalidate_verified_transactions();
    }

    /// Removes what `block` put on chain and whatever now conflicts with it,
    /// then demotes the rest for re-verification.
    ///
    /// Re-verification happens right away only when no future headers are
    /// known. Otherwise the idle loop catches up later.
    pub fn update_pool_for_block_persisted(&self, block: &Block, snapshot: &DataCache) -> ReverifyOutcome {
        let mut conflicting_signers: HashMap<UInt256, HashSet<UInt160>> = HashMap::new();
        let persisted: HashSet<UInt256> = block.transactions.iter().map(Transaction::hash).collect();
        for tx in &block.transactions {
            for conflict in tx.conflicts() {
                conflicting_signers
                    .entry(*conflict)
                    .or_default()
                    .extend(tx.signer_accounts());
            }
        }

        let stale_txs = {
            let mut state = self.state.write();
            for hash in &persisted {
                if state.remove_verified(hash).is_none() {
                    state.remove_unverified(hash);
                }
            }

            let is_stale = |item: &PoolItem| {
                let declared_conflicted = conflicting_signers
                    .get(&item.hash())
                    .map(|signers| item.tx().signers.iter().any(|s| signers.contains(&s.account)))
                    .unwrap_or(false);
                declared_conflicted || item.tx().conflicts().any(|hash| persisted.contains(hash))
            };
            let stale: Vec<UInt256> = state
                .verified
                .values()
                .chain(state.unverified.values())
                .filter(|item| is_stale(item))
                .map(PoolItem::hash)
                .collect();
            let mut stale_txs = Vec::with_capacity(stale.len());
            for hash in &stale {
                let removed = state
                    .remove_verified(hash)
                    .or_else(|| state.remove_unverified(hash));
                stale_txs.extend(removed.map(PoolItem::into_tx));
            }

            self.invalidate_locked(&mut state);
            stale_txs
        };
        self.notify_removed(&stale_txs, TransactionRemovalReason::Conflict);

        if block.index() > 0 && !self.header_cache.is_empty() {
            return ReverifyOutcome {
                more_pending: self.unverified_count() > 0,
                ..ReverifyOutcome::default()
            };
        }
        let budget = Duration::milliseconds((self.settings.ms_per_block / 3) as i64);
        self.reverify(self.settings.max_transactions_per_block as usize, budget, snapshot)
    }

    /// Re-checks up to `max_to_verify` of the highest ranked unverified
    /// transactions within a short time slice.
    pub fn reverify_top_unverified_transactions_if_needed(
        &self,
        max_to_verify: usize,
        snapshot: &DataCache,
    ) -> ReverifyOutcome {
        if !self.header_cache.is_empty() {
            return ReverifyOutcome::default();
        }
        let (verified, unverified) = {
            let state = self.state.read();
            (state.verified.len(), state.unverified.len())
        };
        if unverified == 0 {
            return ReverifyOutcome::default();
        }
        let count = if verified > self.settings.max_transactions_per_block as usize {
            1
        } else {
            max_to_verify
        };
        let budget = Duration::milliseconds((self.settings.ms_per_block / 15) as i64);
        self.reverify(count, budget, snapshot)
    }

    fn reverify(&self, count: usize, budget: Duration, snapshot: &DataCache) -> ReverifyOutcome {
        let cutoff = self.time.utc_now() + budget;
        let mut outcome = ReverifyOutcome::default();
        let mut invalid = Vec::new();
        let mut promoted = 0usize;

        {
            let mut state = self.state.write();
            let mut context = self.context.write();
            let candidates: Vec<UInt256> = state
                .sorted_unverified
                .iter()
                .rev()
                .take(count)
                .map(|key| key.hash)
                .collect();

            for hash in candidates {
                let Some(item) = state.remove_unverified(&hash) else {
                    continue;
                };
                let verdict = state.check_conflicts(item.tx(), &hash).and_then(|conflicts| {
                    let conflicting_txs = state.transactions_of(&conflicts);
                    self.state_verifier()
                        .verify(item.tx(), snapshot, &context, &conflicting_txs)
                        .is_success()
                        .then_some(conflicts)
                });

                match verdict {
                    Some(conflicts) => {
                        context.add_transaction(item.tx());
                        let tx_for_rebroadcast = item.tx().clone();
                        let mut item = item;
                        if self.due_for_rebroadcast(&state, &item) {
                            item.set_last_broadcast_timestamp(self.time.utc_now());
                            outcome.rebroadcast.push(tx_for_rebroadcast);
                        }
                        state.insert_verified(item);
                        for conflict in &conflicts {
                            if let Some(displaced) = state.remove_verified(conflict) {
                                context.remove_transaction(displaced.tx());
                                outcome.displaced.push(displaced.into_tx());
                            }
                        }
                        promoted += 1;
                    }
                    None => invalid.push(item.into_tx()),
                }

                if self.time.utc_now() > cutoff {
                    break;
                }
            }
            outcome.more_pending = !state.unverified.is_empty();
        }

        trace!(target: "neo", promoted, invalid = invalid.len(), rebroadcast = outcome.rebroadcast.len(), "reverified unverified transactions");
        self.notify_removed(&invalid, TransactionRemovalReason::NoLongerValid);
        self.notify_removed(&outcome.displaced, TransactionRemovalReason::Conflict);
        outcome
    }

    fn due_for_rebroadcast(&self, state: &PoolState, item: &PoolItem) -> bool {
        let threshold = (self.capacity / 10).max(1);
        let count = state.len() + 1;
        let mut blocks = self.blocks_till_rebroadcast as i64;
        if count > threshold {
            blocks = blocks * count as i64 / threshold as i64;
        }
        let window = Duration::milliseconds((self.settings.ms_per_block as i64).saturating_mul(blocks));
        let cutoff: DateTime<Utc> = self.time.utc_now() - window;
        item.last_broadcast_timestamp() < cutoff
    }

    fn invalidate_locked(&self, state: &mut PoolState) {
        let verified: Vec<PoolItem> = state.verified.drain().map(|(_, item)| item).collect();
        state.sorted_verified.clear();
        state.conflicts.clear();
        for item in verified {
            if !state.unverified.contains_key(&item.hash()) {
                state.insert_unverified(item);
            }
        }
        self.context.write().clear();
    }

    fn remove_over_capacity(
        &self,
        state: &mut PoolState,
        context: &mut TransactionVerificationContext,
    ) -> Vec<Transaction> {
        let mut removed = Vec::new();
        while state.len() > self.capacity {
            let Some((lowest, verified)) = state.lowest() else {
                break;
            };
            if verified {
                if let Some(item) = state.remove_verified(&lowest.hash) {
                    context.remove_transaction(item.tx());
                    removed.push(item.into_tx());
                }
            } else if let Some(item) = state.remove_unverified(&lowest.hash) {
                removed.push(item.into_tx());
            }
        }
        removed
    }

    fn state_verifier(&self) -> StateVerifier<'_> {
        StateVerifier {
            settings: &self.settings,
            ledger: self.ledger.as_ref(),
            verifier: self.verifier.as_ref(),
        }
    }

    fn notify_added(&self, tx: &Transaction) {
        for observer in self.observers.read().iter() {
            observer.transaction_added(tx);
        }
    }

    fn notify_removed(&self, txs: &[Transaction], reason: TransactionRemovalReason) {
        if txs.is_empty() {
            return;
        }
        debug!(target: "neo", count = txs.len(), %reason, "transactions removed from pool");
        for observer in self.observers.read().iter() {
            observer.transaction_removed(txs, reason);
        }
    }
}
