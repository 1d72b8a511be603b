//
// actor.rs - Mailbox loop of the ledger actor
//

use super::*;
use tracing::{error, info};

impl Blockchain {
    /// Drains the mailboxes in priority order: high, self-sent, normal,
    /// then one idle tick when nothing else is ready.
    pub(super) async fn run(
        mut self,
        mut high: mpsc::Receiver<BlockchainCommand>,
        mut normal: mpsc::Receiver<BlockchainCommand>,
    ) -> ChainResult<()> {
        info!(target: "neo", network = self.settings.network, "ledger actor started");
        loop {
            let command = match high.try_recv() {
                Ok(command) => command,
                Err(_) => match self.pending.pop_front() {
                    Some(command) => command,
                    None => {
                        let idle = self.idle_scheduled;
                        tokio::select! {
                            biased;
                            Some(command) = high.recv() => command,
                            Some(command) = normal.recv() => command,
                            _ = std::future::ready(()), if idle => BlockchainCommand::Idle,
                            else => break,
                        }
                    }
                },
            };

            if matches!(command, BlockchainCommand::Shutdown) {
                info!(target: "neo", "ledger actor shutting down");
                return Ok(());
            }
            if let Err(error) = self.dispatch(command) {
                error!(target: "neo", %error, "ledger actor stopped on fatal error");
                return Err(error);
            }
        }
        info!(target: "neo", "ledger mailboxes closed");
        Ok(())
    }

    fn dispatch(&mut self, command: BlockchainCommand) -> ChainResult<()> {
        match command {
            BlockchainCommand::Initialize { reply } => self.initialize(reply),
            BlockchainCommand::Import { import, reply } => self.handle_import(import, reply),
            BlockchainCommand::FillMemoryPool { fill, reply } => {
                self.handle_fill_memory_pool(fill, reply);
                Ok(())
            }
            BlockchainCommand::Reverify(reverify) => self.handle_reverify(reverify),
            BlockchainCommand::Headers { headers, reply } => {
                self.handle_headers(headers, reply);
                Ok(())
            }
            BlockchainCommand::InventoryBlock {
                block,
                sender,
                reply,
            } => self.handle_block_inventory(block, sender, reply),
            BlockchainCommand::InventoryExtensible {
                payload,
                relay,
                reply,
            } => {
                self.handle_extensible_inventory(payload, relay, reply);
                Ok(())
            }
            BlockchainCommand::Transaction { transaction, reply } => {
                self.handle_transaction(transaction, reply);
                Ok(())
            }
            BlockchainCommand::PreverifyCompleted(task) => {
                self.handle_preverify_completed(task);
                Ok(())
            }
            BlockchainCommand::Idle => {
                self.handle_idle();
                Ok(())
            }
            BlockchainCommand::Shutdown => Ok(()),
        }
    }
}

/// Sends `outcome` to the asker and hands fatal errors back to the loop.
pub(super) fn reply_and_escalate<T>(
    reply: Reply<ChainResult<T>>,
    outcome: ChainResult<T>,
) -> ChainResult<()> {
    let fatal = match &outcome {
        Err(error) if error.is_fatal() => Some(error.clone()),
        _ => None,
    };
    respond(reply, outcome);
    match fatal {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
