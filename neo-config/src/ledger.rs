//! Local tuning of the ledger actor.

use crate::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// How a failing extension hook is handled while a block commits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnhandledExceptionPolicy {
    /// Log the failure and continue
    Ignore,
    /// Disable the offending extension and continue
    #[default]
    StopPlugin,
    /// Abort block persistence and stop the node
    StopNode,
}

/// Settings of the ledger actor that do not affect consensus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSettings {
    /// Block interval the relay throttle is measured against
    #[serde(default = "default_relay_reference_block_time_ms")]
    pub relay_reference_block_time_ms: u64,

    /// Number of most recently persisted blocks that are always re-broadcast
    #[serde(default = "default_relay_base_blocks")]
    pub relay_base_blocks: u32,

    /// How far below the header tip a buffered block may sit and still be relayed
    #[serde(default = "default_relay_window")]
    pub relay_window: u32,

    /// Unverified pool entries re-checked per idle tick
    #[serde(default = "default_max_tx_to_reverify_per_idle")]
    pub max_tx_to_reverify_per_idle: usize,

    /// Blocks to wait before a pooled transaction is broadcast again
    #[serde(default = "default_blocks_till_rebroadcast")]
    pub blocks_till_rebroadcast: u32,

    /// Policy applied to extensions that do not declare their own
    #[serde(default)]
    pub exception_policy: UnhandledExceptionPolicy,

    /// Capacity of the mailbox for headers, blocks, payloads and control messages
    #[serde(default = "default_high_priority_capacity")]
    pub high_priority_capacity: usize,

    /// Capacity of the mailbox for transactions and background work
    #[serde(default = "default_normal_priority_capacity")]
    pub normal_priority_capacity: usize,
}

fn default_relay_reference_block_time_ms() -> u64 {
    15000
}

fn default_relay_base_blocks() -> u32 {
    2
}

fn default_relay_window() -> u32 {
    99
}

fn default_max_tx_to_reverify_per_idle() -> usize {
    10
}

fn default_blocks_till_rebroadcast() -> u32 {
    10
}

fn default_high_priority_capacity() -> usize {
    1024
}

fn default_normal_priority_capacity() -> usize {
    8192
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            relay_reference_block_time_ms: default_relay_reference_block_time_ms(),
            relay_base_blocks: default_relay_base_blocks(),
            relay_window: default_relay_window(),
            max_tx_to_reverify_per_idle: default_max_tx_to_reverify_per_idle(),
            blocks_till_rebroadcast: default_blocks_till_rebroadcast(),
            exception_policy: UnhandledExceptionPolicy::default(),
            high_priority_capacity: default_high_priority_capacity(),
            normal_priority_capacity: default_normal_priority_capacity(),
        }
    }
}

impl LedgerSettings {
    /// Number of freshly persisted blocks to relay when a run of cached
    /// blocks is persisted in one go.
    ///
    /// Chains configured faster than the reference interval relay one extra
    /// block per full second of difference.
    pub fn blocks_to_relay(&self, ms_per_block: u64) -> u32 {
        let extra = if ms_per_block < self.relay_reference_block_time_ms {
            (self.relay_reference_block_time_ms - ms_per_block) / 1000
        } else {
            0
        };
        self.relay_base_blocks
            .saturating_add(u32::try_from(extra).unwrap_or(u32::MAX))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.high_priority_capacity == 0 || self.normal_priority_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "mailbox capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_tx_to_reverify_per_idle == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_tx_to_reverify_per_idle",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
