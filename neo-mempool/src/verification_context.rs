//! Per-pool aggregate of unconfirmed sender spend and oracle-response claims.

use neo_core::network::payloads::Transaction;
use neo_core::persistence::DataCache;
use neo_primitives::{UInt160, UInt256};
use num_bigint::BigInt;
use num_traits::Zero;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Reads an account's spendable fee balance from a snapshot.
pub type BalanceProvider = Arc<dyn Fn(&DataCache, &UInt160) -> BigInt + Send + Sync>;

/// Tracks what verified pooled transactions already commit each sender to.
pub struct TransactionVerificationContext {
    sender_fee: HashMap<UInt160, BigInt>,
    oracle_responses: HashMap<u64, UInt256>,
    balance_provider: BalanceProvider,
}

impl fmt::Debug for TransactionVerificationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionVerificationContext")
            .field("senders", &self.sender_fee.len())
            .field("oracle_responses", &self.oracle_responses.len())
            .finish()
    }
}

impl TransactionVerificationContext {
    pub fn new(balance_provider: BalanceProvider) -> Self {
        Self {
            sender_fee: HashMap::new(),
            oracle_responses: HashMap::new(),
            balance_provider,
        }
    }

    pub fn with_balance_provider<F>(provider: F) -> Self
    where
        F: Fn(&DataCache, &UInt160) -> BigInt + Send + Sync + 'static,
    {
        Self::new(Arc::new(provider))
    }

    /// Returns the total tracked fee for the specified sender.
    pub fn total_fee_for_sender(&self, sender: &UInt160) -> Option<&BigInt> {
        self.sender_fee.get(sender)
    }

    pub fn oracle_response_claimed(&self, id: u64) -> bool {
        self.oracle_responses.contains_key(&id)
    }

    pub fn add_transaction(&mut self, tx: &Transaction) {
        *self.sender_fee.entry(tx.sender()).or_default() += BigInt::from(tx.fee());
        if let Some(id) = tx.oracle_response_id() {
            self.oracle_responses.insert(id, tx.hash());
        }
    }

    pub fn remove_transaction(&mut self, tx: &Transaction) {
        let sender = tx.sender();
        if let Some(total) = self.sender_fee.get_mut(&sender) {
            *total -= BigInt::from(tx.fee());
            if total.is_zero() {
                self.sender_fee.remove(&sender);
            }
        }
        if let Some(id) = tx.oracle_response_id() {
            self.oracle_responses.remove(&id);
        }
    }

    /// Forgets every tracked transaction.
    pub fn clear(&mut self) {
        self.sender_fee.clear();
        self.oracle_responses.clear();
    }

    /// True if the sender can pay for `tx` on top of its pooled transactions,
    /// net of the same-sender `conflicting` transactions `tx` would displace,
    /// and no pending transaction already answers the same oracle request.
    pub fn check_transaction<'a, I>(&self, tx: &Transaction, conflicting: I, snapshot: &DataCache) -> bool
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let sender = tx.sender();
        let mut expected_fee = BigInt::from(tx.fee());
        if let Some(pooled) = self.sender_fee.get(&sender) {
            expected_fee += pooled;
        }
        for conflict in conflicting {
            if conflict.sender() == sender {
                expected_fee -= BigInt::from(conflict.fee());
            }
        }

        if (self.balance_provider)(snapshot, &sender) < expected_fee {
            return false;
        }

        match tx.oracle_response_id() {
            Some(id) => !self.oracle_responses.contains_key(&id),
            None => true,
        }
    }
}
