use super::{TriggerType, VmState};
use crate::network::payloads::Transaction;
use serde::{Deserialize, Serialize};

/// Outcome of one engine run during block persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationExecuted {
    /// `None` for the system scripts.
    pub transaction: Option<Transaction>,
    pub trigger: TriggerType,
    pub vm_state: VmState,
    pub gas_consumed: i64,
    /// Fault reason when `vm_state` is [`VmState::Fault`].
    pub exception: Option<String>,
}

impl ApplicationExecuted {
    pub fn from_engine(
        transaction: Option<Transaction>,
        trigger: TriggerType,
        engine: &dyn super::ExecutionEngine,
    ) -> Self {
        Self {
            transaction,
            trigger,
            vm_state: engine.state(),
            gas_consumed: engine.gas_consumed(),
            exception: engine.fault_exception(),
        }
    }

    pub fn is_halt(&self) -> bool {
        self.vm_state == VmState::Halt
    }
}
