//! # Neo Core
//!
//! Ledger data model and the collaborator surfaces used by the admission pipeline:
//! - `network::payloads`: blocks, headers, transactions and extensible payloads
//! - `persistence`: layered `DataCache` snapshots over a `Store`
//! - `ledger`: the concurrently readable `HeaderCache` and the ledger/verifier traits
//! - `smart_contract`: the script executor boundary used during block persistence
//!
//! ```rust
//! use neo_core::network::payloads::{Block, Transaction};
//! use neo_config::ProtocolSettings;
//!
//! let genesis = Block::genesis(&ProtocolSettings::mainnet());
//! assert_eq!(genesis.index(), 0);
//! assert!(genesis.prev_hash().is_zero());
//! assert_ne!(Transaction::default().hash(), genesis.hash());
//! ```

pub mod crypto;
pub mod error;
pub mod io;
pub mod ledger;
pub mod network;
pub mod persistence;
pub mod smart_contract;
pub mod time_provider;

pub use error::{CoreError, CoreResult};
pub use neo_primitives::{UInt160, UInt256, VerifyResult};
