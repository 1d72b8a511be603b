//! State-dependent transaction checks run on admission and re-verification.

use crate::TransactionVerificationContext;
use neo_config::ProtocolSettings;
use neo_core::ledger::{InventoryVerifier, LedgerProvider};
use neo_core::network::payloads::Transaction;
use neo_core::persistence::DataCache;
use neo_primitives::VerifyResult;

/// Bundles the collaborators a state-dependent check consults.
pub struct StateVerifier<'a> {
    pub settings: &'a ProtocolSettings,
    pub ledger: &'a dyn LedgerProvider,
    pub verifier: &'a dyn InventoryVerifier,
}

impl StateVerifier<'_> {
    /// Checks `tx` against `snapshot` and the pool's pending spend.
    ///
    /// `conflicts` are the pooled transactions `tx` would displace.
    pub fn verify(
        &self,
        tx: &Transaction,
        snapshot: &DataCache,
        context: &TransactionVerificationContext,
        conflicts: &[Transaction],
    ) -> VerifyResult {
        let height = self.ledger.current_index(snapshot);
        if tx.is_expired_at(height, self.settings) {
            return VerifyResult::Expired;
        }

        let attributes = tx.verify_attributes(height);
        if !attributes.is_success() {
            return attributes;
        }
        // A conflicting transaction that already made it on chain cannot be replaced.
        if tx
            .conflicts()
            .any(|hash| self.ledger.contains_transaction(snapshot, hash))
        {
            return VerifyResult::InvalidAttribute;
        }

        if !context.check_transaction(tx, conflicts, snapshot) {
            return VerifyResult::InsufficientFunds;
        }

        self.verifier
            .verify_state_dependent(tx, self.settings, snapshot)
    }
}
