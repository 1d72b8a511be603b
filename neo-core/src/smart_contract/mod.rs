//! The surface the ledger needs from the script executor.

mod application_executed;
mod executor;
mod trigger_type;

pub use application_executed::ApplicationExecuted;
pub use executor::{
    system_script, ExecutionEngine, ScriptExecutor, VmState, ON_PERSIST_SCRIPT,
    POST_PERSIST_SCRIPT,
};
pub use trigger_type::TriggerType;
