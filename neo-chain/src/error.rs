//! Chain error types

use neo_core::smart_contract::TriggerType;
use neo_core::CoreError;
use neo_primitives::UInt256;
use thiserror::Error;

/// Failures of the ledger actor that are not ordinary admission outcomes.
///
/// Rejected inventory is reported through `VerifyResult`. These errors mean
/// the request could not be carried out at all, and the fatal ones stop the
/// actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The actor task has exited and can no longer answer
    #[error("ledger actor is no longer running")]
    ActorStopped,

    /// The stored chain was built from a different genesis block
    #[error("genesis block mismatch: expected {expected}, found {actual}")]
    GenesisMismatch { expected: UInt256, actual: UInt256 },

    /// A protocol-mandated block script did not halt
    #[error("{trigger} script faulted: {reason}")]
    SystemScriptFault { trigger: TriggerType, reason: String },

    /// An extension configured to stop the node failed while committing
    #[error("extension {name} aborted block persistence: {reason}")]
    ExtensionAborted { name: String, reason: String },

    /// Imported blocks skipped a height
    #[error("import out of sequence: expected block {expected}, got {actual}")]
    ImportDiscontiguous { expected: u32, actual: u32 },

    /// An imported block failed verification
    #[error("imported block {index} failed verification")]
    ImportVerificationFailed { index: u32 },

    /// Storage failure
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ChainError {
    /// Whether the actor must stop after this error.
    ///
    /// Import errors only fail the request that caused them.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::ActorStopped | Self::ImportDiscontiguous { .. } | Self::ImportVerificationFailed { .. }
        )
    }
}

/// Result type for chain operations
pub type ChainResult<T> = Result<T, ChainError>;
