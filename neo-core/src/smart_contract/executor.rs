use super::TriggerType;
use crate::crypto::sha256;
use crate::network::payloads::{Block, Transaction};
use crate::persistence::DataCache;
use neo_config::ProtocolSettings;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Final state of an engine run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum VmState {
    #[default]
    None = 0,
    Halt = 1,
    Fault = 2,
    Break = 4,
}

const SYSCALL: u8 = 0x41;

/// Builds the one-instruction script invoking the interop service `name`.
pub fn system_script(name: &str) -> Vec<u8> {
    let mut script = Vec::with_capacity(5);
    script.push(SYSCALL);
    script.extend_from_slice(&sha256(name.as_bytes())[..4]);
    script
}

/// Script run under [`TriggerType::OnPersist`].
pub static ON_PERSIST_SCRIPT: Lazy<Vec<u8>> =
    Lazy::new(|| system_script("System.Contract.NativeOnPersist"));

/// Script run under [`TriggerType::PostPersist`].
pub static POST_PERSIST_SCRIPT: Lazy<Vec<u8>> =
    Lazy::new(|| system_script("System.Contract.NativePostPersist"));

/// A single script execution bound to a working snapshot.
///
/// Writes made by the script are visible only through [`ExecutionEngine::snapshot`]
/// until the caller commits that cache.
pub trait ExecutionEngine: Send {
    fn load_script(&mut self, script: &[u8]);

    fn execute(&mut self) -> VmState;

    fn state(&self) -> VmState;

    fn gas_consumed(&self) -> i64;

    fn fault_exception(&self) -> Option<String>;

    fn snapshot(&self) -> &DataCache;
}

/// Factory for execution engines.
pub trait ScriptExecutor: Send + Sync {
    fn create(
        &self,
        trigger: TriggerType,
        container: Option<&Transaction>,
        snapshot: DataCache,
        block: &Block,
        settings: &ProtocolSettings,
        gas: i64,
    ) -> Box<dyn ExecutionEngine>;
}
