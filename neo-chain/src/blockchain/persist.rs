//
// persist.rs - Atomic block persistence
//

use super::*;
use crate::error::ChainError;
use neo_core::smart_contract::{
    ApplicationExecuted, TriggerType, VmState, ON_PERSIST_SCRIPT, POST_PERSIST_SCRIPT,
};
use tracing::{debug, error, info};

impl Blockchain {
    /// Applies `block` to the store.
    ///
    /// Every write goes through one snapshot that is committed only after
    /// both system scripts halted and the committing hooks agreed, so a
    /// failure leaves the store untouched. Transactions run on a child
    /// snapshot that is folded in when they halt and thrown away when they
    /// fault.
    pub(super) fn persist(&mut self, block: &Block) -> ChainResult<()> {
        let index = block.index();
        let hash = block.hash();
        let snapshot = self.snapshot();
        let mut executed = Vec::with_capacity(block.transactions.len() + 2);

        executed.push(self.run_system_script(
            TriggerType::OnPersist,
            ON_PERSIST_SCRIPT.as_slice(),
            &snapshot,
            block,
        )?);

        let mut cloned_snapshot = snapshot.clone_cache();
        for tx in &block.transactions {
            let mut engine = self.executor.create(
                TriggerType::Application,
                Some(tx),
                cloned_snapshot.clone(),
                block,
                &self.settings,
                tx.system_fee,
            );
            engine.load_script(&tx.script);
            let state = engine.execute();
            let application =
                ApplicationExecuted::from_engine(Some(tx.clone()), TriggerType::Application, &*engine);
            drop(engine);

            if state == VmState::Halt {
                cloned_snapshot.commit()?;
            } else {
                debug!(
                    target: "neo",
                    index,
                    tx = %tx.hash(),
                    exception = application.exception.as_deref().unwrap_or_default(),
                    "transaction faulted; discarding its writes"
                );
                cloned_snapshot = snapshot.clone_cache();
            }
            self.publish(BlockchainEvent::ApplicationExecuted(application.clone()));
            executed.push(application);
        }

        executed.push(self.run_system_script(
            TriggerType::PostPersist,
            POST_PERSIST_SCRIPT.as_slice(),
            &snapshot,
            block,
        )?);

        self.extensions
            .invoke_committing(block, &snapshot, &executed)?;
        snapshot.commit()?;
        self.extensions.invoke_committed(block)?;

        let outcome = self
            .mempool
            .update_pool_for_block_persisted(block, &self.snapshot());
        self.extensible_witness_white_list = None;
        self.block_cache.remove(block.prev_hash());
        self.publish(BlockchainEvent::PersistCompleted(PersistCompleted {
            block: block.clone(),
        }));
        if let Err(front) = self.header_cache.pop_front_expected(index) {
            error!(
                target: "neo",
                index,
                front,
                "header cache out of step with persisted height"
            );
        }
        self.apply_reverify_outcome(outcome);

        info!(
            target: "neo",
            index,
            %hash,
            transactions = block.transactions.len(),
            "block persisted"
        );
        Ok(())
    }

    /// Runs a protocol-mandated block script directly on `snapshot`.
    fn run_system_script(
        &self,
        trigger: TriggerType,
        script: &[u8],
        snapshot: &DataCache,
        block: &Block,
    ) -> ChainResult<ApplicationExecuted> {
        let mut engine = self
            .executor
            .create(trigger, None, snapshot.clone(), block, &self.settings, 0);
        engine.load_script(script);
        if engine.execute() != VmState::Halt {
            let reason = engine
                .fault_exception()
                .unwrap_or_else(|| format!("engine stopped in state {:?}", engine.state()));
            error!(
                target: "neo",
                index = block.index(),
                %trigger,
                %reason,
                "system script did not halt"
            );
            return Err(ChainError::SystemScriptFault { trigger, reason });
        }
        let application = ApplicationExecuted::from_engine(None, trigger, &*engine);
        self.publish(BlockchainEvent::ApplicationExecuted(application.clone()));
        Ok(application)
    }
}
