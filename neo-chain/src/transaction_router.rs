//! Off-actor pre-verification of incoming transactions.
//!
//! State-independent checks are CPU bound, so they run on the blocking pool
//! and report back to the ledger actor as a [`PreverifyCompleted`] message.
//! The actor re-checks ledger state before admitting the transaction.

use crate::blockchain::BlockchainCommand;
use neo_config::ProtocolSettings;
use neo_core::ledger::InventoryVerifier;
use neo_core::network::payloads::Transaction;
use neo_primitives::VerifyResult;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Preverify {
    pub transaction: Transaction,
    pub relay: bool,
}

#[derive(Debug)]
pub struct PreverifyCompleted {
    pub transaction: Transaction,
    pub relay: bool,
    pub result: VerifyResult,
    pub(crate) reply: Option<oneshot::Sender<VerifyResult>>,
}

/// Transaction router for handling transaction pre-verification
pub struct TransactionRouter {
    settings: Arc<ProtocolSettings>,
    verifier: Arc<dyn InventoryVerifier>,
    mailbox: mpsc::WeakSender<BlockchainCommand>,
}

impl TransactionRouter {
    /// The router only holds a weak reference to the mailbox so it never
    /// keeps a stopped actor's queue alive.
    pub(crate) fn new(
        settings: Arc<ProtocolSettings>,
        verifier: Arc<dyn InventoryVerifier>,
        mailbox: mpsc::WeakSender<BlockchainCommand>,
    ) -> Self {
        Self {
            settings,
            verifier,
            mailbox,
        }
    }

    /// Runs the checks inline.
    pub fn on_receive(&self, message: &Preverify) -> PreverifyCompleted {
        let result = message
            .transaction
            .verify_state_independent(&self.settings, self.verifier.as_ref());
        PreverifyCompleted {
            transaction: message.transaction.clone(),
            relay: message.relay,
            result,
            reply: None,
        }
    }

    /// Runs the checks on the blocking pool and posts the outcome back to the actor.
    pub(crate) fn forward(&self, message: Preverify, reply: Option<oneshot::Sender<VerifyResult>>) {
        let settings = Arc::clone(&self.settings);
        let verifier = Arc::clone(&self.verifier);
        let mailbox = self.mailbox.clone();
        tokio::spawn(async move {
            let Preverify { transaction, relay } = message;
            let hash = transaction.hash();
            let (transaction, result) = match tokio::task::spawn_blocking(move || {
                let result = transaction.verify_state_independent(&settings, verifier.as_ref());
                (transaction, result)
            })
            .await
            {
                Ok(done) => done,
                Err(error) => {
                    warn!(target: "neo", %error, %hash, "transaction preverification task failed");
                    crate::blockchain::respond(reply, VerifyResult::Unknown);
                    return;
                }
            };

            let Some(mailbox) = mailbox.upgrade() else {
                debug!(target: "neo", %hash, "ledger stopped before preverification finished");
                return;
            };
            let completed = PreverifyCompleted {
                transaction,
                relay,
                result,
                reply,
            };
            if mailbox
                .send(BlockchainCommand::PreverifyCompleted(completed))
                .await
                .is_err()
            {
                debug!(target: "neo", %hash, "ledger mailbox closed before preverification result");
            }
        });
    }
}
