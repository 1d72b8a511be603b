//! Protocol settings for the Neo N3 ledger
//!
//! These settings define the protocol parameters the ledger core enforces.
//! They must be consistent across all nodes in a network.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Neo N3 protocol settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolSettings {
    /// Network identifier (magic number)
    #[serde(default = "default_network")]
    pub network: u32,

    /// Milliseconds per block
    #[serde(default = "default_ms_per_block")]
    pub ms_per_block: u64,

    /// Maximum time for transaction validity (in blocks)
    #[serde(default = "default_max_valid_until_block_increment")]
    pub max_valid_until_block_increment: u32,

    /// Number of consensus validators
    #[serde(default = "default_validators_count")]
    pub validators_count: u32,

    /// Maximum number of transactions per block
    #[serde(default = "default_max_transactions_per_block")]
    pub max_transactions_per_block: u32,

    /// Memory pool capacity
    #[serde(default = "default_memory_pool_max_transactions")]
    pub memory_pool_max_transactions: u32,

    /// Number of blocks back that conflict records stay traceable
    #[serde(default = "default_max_traceable_blocks")]
    pub max_traceable_blocks: u32,
}

fn default_network() -> u32 {
    860833102
}

fn default_ms_per_block() -> u64 {
    15000 // 15 seconds
}

fn default_max_valid_until_block_increment() -> u32 {
    5760 // ~24 hours at 15 sec/block
}

fn default_validators_count() -> u32 {
    7
}

fn default_max_transactions_per_block() -> u32 {
    512
}

fn default_memory_pool_max_transactions() -> u32 {
    50000
}

fn default_max_traceable_blocks() -> u32 {
    2_102_400 // ~1 year at 15 sec/block
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self::mainnet()
    }
}

impl ProtocolSettings {
    /// MainNet protocol settings
    pub fn mainnet() -> Self {
        Self {
            network: default_network(),
            ms_per_block: default_ms_per_block(),
            max_valid_until_block_increment: default_max_valid_until_block_increment(),
            validators_count: default_validators_count(),
            max_transactions_per_block: default_max_transactions_per_block(),
            memory_pool_max_transactions: default_memory_pool_max_transactions(),
            max_traceable_blocks: default_max_traceable_blocks(),
        }
    }

    /// TestNet protocol settings
    pub fn testnet() -> Self {
        Self {
            network: 894710606,
            ..Self::mainnet()
        }
    }

    /// Private network protocol settings
    pub fn private(network_magic: u32) -> Self {
        Self {
            network: network_magic,
            ms_per_block: 1000, // Faster for testing
            validators_count: 1,
            ..Self::mainnet()
        }
    }

    /// Duration of one block interval.
    pub fn time_per_block(&self) -> Duration {
        Duration::from_millis(self.ms_per_block)
    }

    /// Rejects settings the ledger cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ms_per_block == 0 {
            return Err(ConfigError::InvalidValue {
                field: "ms_per_block",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.memory_pool_max_transactions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "memory_pool_max_transactions",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.validators_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "validators_count",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
