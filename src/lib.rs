//! # Neo Ledger Gate
//!
//! The ledger admission pipeline of a Neo N3 node: the blockchain actor that
//! serializes block persistence, header sync and transaction admission, and
//! the memory pool it keeps consistent with the chain.
//!
//! ## Quick Start
//!
//! ```ignore
//! use neo_ledger_gate::{LedgerSystem, NodeConfig};
//!
//! let config = NodeConfig::load("neo.toml")?;
//! LedgerSystem::init_logging(&config)?;
//! let system = LedgerSystem::start(config, context, Vec::new()).await?;
//! let result = system.blockchain().submit_transaction(tx).await?;
//! system.shutdown().await?;
//! ```
//!
//! ## Architecture
//!
//! - [`neo_primitives`] - Hashes and verification verdicts
//! - [`neo_config`] - Protocol settings, ledger tuning and node configuration
//! - [`neo_telemetry`] - Structured logging
//! - [`neo_core`] - Blocks, transactions, storage and collaborator contracts
//! - [`neo_mempool`] - Memory pool and verification context
//! - [`neo_chain`] - The blockchain actor and its handle

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod system;

pub use neo_chain as chain;
pub use neo_config as config;
pub use neo_core as core;
pub use neo_mempool as mempool;
pub use neo_primitives as primitives;
pub use neo_telemetry as telemetry;

pub use system::{LedgerSystem, SystemError, SystemResult};

/// Common imports for embedding the ledger gate
pub mod prelude {
    pub use crate::chain::{
        BlockchainContext, BlockchainEvent, BlockchainHandle, CommitHandler, HookError,
    };
    pub use crate::config::{LedgerSettings, NodeConfig, ProtocolSettings};
    pub use crate::core::network::payloads::{Block, Header, Transaction};
    pub use crate::mempool::MemoryPool;
    pub use crate::primitives::{UInt160, UInt256, VerifyResult};
    pub use crate::{LedgerSystem, SystemError};
}

pub use neo_config::NodeConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
