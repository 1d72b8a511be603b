//! # Neo Chain
//!
//! The ledger gate of a Neo N3 node: the single task that decides what enters
//! the chain and the memory pool.
//!
//! ## Features
//!
//! - Ordered block persistence with OnPersist / PostPersist system scripts
//! - Header cache fed by sync, ahead of persisted blocks
//! - Buffering of blocks that arrive before their predecessor
//! - Transaction admission with off-actor preverification
//! - Extensible payload verification against the witness whitelist
//! - Commit hooks with per-handler exception policies
//!
//! ## Example
//!
//! ```ignore
//! let (chain, task) = Blockchain::spawn(settings, LedgerSettings::default(), context, CommitHandlers::default());
//! chain.initialize().await?;
//! let result = chain.submit_transaction(tx).await?;
//! ```

pub mod blockchain;
mod collaborators;
mod error;
pub mod extensions;
pub mod transaction_router;

pub use blockchain::{
    Blockchain, BlockchainCommand, BlockchainContext, BlockchainEvent, BlockchainHandle,
    FillMemoryPool, Import, PersistCompleted, RelayResult, Reverify,
};
pub use collaborators::{Detached, NetworkChannel, PeerId, SyncObserver};
pub use error::{ChainError, ChainResult};
pub use extensions::{CommitHandler, CommitHandlers, HookError};
pub use transaction_router::{Preverify, PreverifyCompleted, TransactionRouter};
