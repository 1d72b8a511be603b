//
// handlers.rs - Message handlers for the ledger actor
//

use super::actor::reply_and_escalate;
use super::messages::{classify_import_block, should_schedule_reverify_idle, ImportDisposition};
use super::*;
use crate::collaborators::PeerId;
use crate::error::ChainError;
use crate::transaction_router::{Preverify, PreverifyCompleted};
use neo_core::network::payloads::{ExtensiblePayload, Header, Inventory, Transaction};
use neo_mempool::ReverifyOutcome;
use neo_primitives::VerifyResult;
use tracing::{debug, info, warn};

impl Blockchain {
    /// Persists the genesis block on an empty store, otherwise checks that
    /// the stored chain starts with it.
    pub(super) fn initialize(&mut self, reply: Reply<ChainResult<()>>) -> ChainResult<()> {
        let outcome = self.ensure_genesis();
        reply_and_escalate(reply, outcome)
    }

    fn ensure_genesis(&mut self) -> ChainResult<()> {
        let snapshot = self.snapshot();
        let expected = self.genesis.hash();
        if !self.ledger.initialized(&snapshot) {
            info!(target: "neo", hash = %expected, "persisting genesis block");
            let genesis = self.genesis.clone();
            return self.persist(&genesis);
        }

        let actual = self.ledger.get_block_hash(&snapshot, 0).unwrap_or_default();
        if actual != expected {
            return Err(ChainError::GenesisMismatch { expected, actual });
        }
        debug!(target: "neo", "ledger already contains genesis block; skipping initialization");
        Ok(())
    }

    pub(super) fn handle_import(
        &mut self,
        import: Import,
        reply: Reply<ChainResult<()>>,
    ) -> ChainResult<()> {
        let outcome = self.import_blocks(import);
        if outcome.is_ok() {
            self.publish(BlockchainEvent::ImportCompleted);
        }
        reply_and_escalate(reply, outcome)
    }

    fn import_blocks(&mut self, import: Import) -> ChainResult<()> {
        let mut current_height = self.ledger.current_index(&self.snapshot());
        for block in import.blocks {
            let index = block.index();
            match classify_import_block(current_height, index) {
                ImportDisposition::AlreadySeen => continue,
                ImportDisposition::FutureGap => {
                    warn!(
                        target: "neo",
                        expected = current_height + 1,
                        actual = index,
                        "import block out of sequence"
                    );
                    return Err(ChainError::ImportDiscontiguous {
                        expected: current_height + 1,
                        actual: index,
                    });
                }
                ImportDisposition::NextExpected => {}
            }

            if import.verify {
                let snapshot = self.snapshot();
                let verified = self.previous_header(&snapshot, index).is_some_and(|prev| {
                    block.verify(&prev, &self.settings, &snapshot, self.verifier.as_ref())
                });
                if !verified {
                    warn!(target: "neo", height = index, "import block failed verification");
                    return Err(ChainError::ImportVerificationFailed { index });
                }
            }

            self.persist(&block)?;
            current_height = index;
        }
        Ok(())
    }

    /// Replaces the pool contents with `fill`, keeping previous entries as
    /// unverified so the idle loop can re-admit them.
    pub(super) fn handle_fill_memory_pool(&mut self, fill: FillMemoryPool, reply: Reply<()>) {
        self.mempool.invalidate_all_transactions();

        let snapshot = self.snapshot();
        let mut added = 0usize;
        for tx in &fill.transactions {
            let hash = tx.hash();
            if self.ledger.contains_transaction(&snapshot, &hash) {
                continue;
            }
            if self.conflicts_on_chain(tx, &snapshot) {
                continue;
            }
            self.mempool.try_remove_unverified(&hash);
            if self.mempool.try_add(tx, &snapshot).is_success() {
                added += 1;
            }
        }
        debug!(
            target: "neo",
            offered = fill.transactions.len(),
            added,
            unverified = self.mempool.unverified_count(),
            "memory pool refilled"
        );

        if should_schedule_reverify_idle(
            self.mempool.unverified_count() > 0,
            !self.header_cache.is_empty(),
        ) {
            self.idle_scheduled = true;
        }
        self.publish(BlockchainEvent::FillCompleted);
        respond(reply, ());
    }

    /// Re-admits inventory without relaying it.
    pub(super) fn handle_reverify(&mut self, reverify: Reverify) -> ChainResult<()> {
        for inventory in reverify.inventories {
            let result = match &inventory {
                Inventory::Block(block) => self.on_new_block(block, None)?,
                Inventory::Transaction(tx) => self.on_new_transaction(tx),
                Inventory::Extensible(payload) => self.on_new_extensible(payload),
            };
            self.publish_inventory_relay_result(inventory, result, false);
        }
        Ok(())
    }

    /// Extends the header cache with the contiguous, verifiable prefix of `headers`.
    pub(super) fn handle_headers(&mut self, mut headers: Vec<Header>, reply: Reply<usize>) {
        let mut accepted = Vec::new();
        if !self.header_cache.is_full() {
            headers.sort_by_key(Header::index);
            let snapshot = self.snapshot();
            let mut header_height = self.header_height(self.ledger.current_index(&snapshot));
            for header in headers {
                let index = header.index();
                if index <= header_height {
                    continue;
                }
                if index != header_height + 1 {
                    break;
                }
                let verified = self.previous_header(&snapshot, index).is_some_and(|prev| {
                    header.verify(&prev, &self.settings, &snapshot, self.verifier.as_ref())
                });
                if !verified {
                    warn!(target: "neo", index, hash = %header.hash(), "header verification failed");
                    break;
                }
                if !self.header_cache.push_back(header.clone()) {
                    break;
                }
                header_height = index;
                accepted.push(header);
            }
        }

        if !accepted.is_empty() {
            debug!(target: "neo", count = accepted.len(), tip = accepted.last().map(Header::index), "headers accepted");
            self.sync.on_headers(&accepted);
        }
        respond(reply, accepted.len());
    }

    pub(super) fn handle_block_inventory(
        &mut self,
        block: Block,
        sender: Option<PeerId>,
        reply: Reply<ChainResult<VerifyResult>>,
    ) -> ChainResult<()> {
        let outcome = self.on_new_block(&block, sender);
        if let Ok(result) = outcome {
            self.publish_inventory_relay_result(block.into(), result, false);
        }
        reply_and_escalate(reply, outcome)
    }

    pub(super) fn handle_extensible_inventory(
        &mut self,
        payload: ExtensiblePayload,
        relay: bool,
        reply: Reply<VerifyResult>,
    ) {
        let result = self.on_new_extensible(&payload);
        self.publish_inventory_relay_result(payload.into(), result, relay);
        respond(reply, result);
    }

    fn on_new_extensible(&mut self, payload: &ExtensiblePayload) -> VerifyResult {
        let snapshot = self.snapshot();
        let height = self.ledger.current_index(&snapshot);
        let ledger = &self.ledger;
        let whitelist = self
            .extensible_witness_white_list
            .get_or_insert_with(|| ledger.extensible_witness_whitelist(&snapshot));
        if !payload.verify(height, whitelist, &self.settings, &snapshot, self.verifier.as_ref()) {
            debug!(target: "neo", hash = %payload.hash(), sender = %payload.sender, "extensible payload rejected");
            return VerifyResult::Invalid;
        }
        VerifyResult::Succeed
    }

    /// Rejects known or conflicting transactions right away and hands the
    /// rest to the preverification worker.
    pub(super) fn handle_transaction(&mut self, transaction: Transaction, reply: Reply<VerifyResult>) {
        let snapshot = self.snapshot();
        if let Some(result) = self.check_known_transaction(&transaction, &snapshot) {
            self.publish_inventory_relay_result(transaction.into(), result, false);
            respond(reply, result);
            return;
        }
        self.router.forward(
            Preverify {
                transaction,
                relay: true,
            },
            reply,
        );
    }

    /// Ledger state may have moved while the worker ran, so the duplicate
    /// and conflict checks run again before admission.
    pub(super) fn handle_preverify_completed(&mut self, task: PreverifyCompleted) {
        let PreverifyCompleted {
            transaction,
            relay,
            result,
            reply,
        } = task;
        let result = if result.is_success() {
            self.on_new_transaction(&transaction)
        } else {
            debug!(target: "neo", hash = %transaction.hash(), %result, "transaction failed preverification");
            result
        };
        self.publish_inventory_relay_result(transaction.into(), result, relay);
        respond(reply, result);
    }

    fn on_new_transaction(&mut self, tx: &Transaction) -> VerifyResult {
        let snapshot = self.snapshot();
        if let Some(result) = self.check_known_transaction(tx, &snapshot) {
            return result;
        }
        self.mempool.try_add(tx, &snapshot)
    }

    fn check_known_transaction(&self, tx: &Transaction, snapshot: &DataCache) -> Option<VerifyResult> {
        let hash = tx.hash();
        if self.mempool.contains(&hash) {
            return Some(VerifyResult::AlreadyInPool);
        }
        if self.ledger.contains_transaction(snapshot, &hash) {
            return Some(VerifyResult::AlreadyExists);
        }
        if self.conflicts_on_chain(tx, snapshot) {
            return Some(VerifyResult::HasConflicts);
        }
        None
    }

    /// Whether a persisted transaction sharing a signer declared `tx` as conflicting.
    fn conflicts_on_chain(&self, tx: &Transaction, snapshot: &DataCache) -> bool {
        self.ledger.contains_conflict_hash(
            snapshot,
            &tx.hash(),
            &tx.signer_accounts(),
            self.settings.max_traceable_blocks,
        )
    }

    pub(super) fn handle_idle(&mut self) {
        self.idle_scheduled = false;
        let outcome = self.mempool.reverify_top_unverified_transactions_if_needed(
            self.ledger_settings.max_tx_to_reverify_per_idle,
            &self.snapshot(),
        );
        self.apply_reverify_outcome(outcome);
    }

    /// Relays what the pool wants rebroadcast, reports displaced
    /// transactions and keeps the idle loop going while work remains.
    pub(super) fn apply_reverify_outcome(&mut self, outcome: ReverifyOutcome) {
        for tx in outcome.rebroadcast {
            self.network.relay_directly(Inventory::Transaction(tx));
        }
        for tx in outcome.displaced {
            self.publish_inventory_relay_result(tx.into(), VerifyResult::HasConflicts, false);
        }
        if should_schedule_reverify_idle(outcome.more_pending, !self.header_cache.is_empty()) {
            self.idle_scheduled = true;
        }
    }

    fn publish_inventory_relay_result(&self, inventory: Inventory, result: VerifyResult, relay: bool) {
        if relay && result.is_success() {
            self.network.relay_directly(inventory.clone());
        }
        self.publish(BlockchainEvent::RelayResult(RelayResult { inventory, result }));
    }
}
