//! Node configuration management.
//!
//! One TOML document carries every section the ledger core reads:
//!
//! ```toml
//! [protocol]
//! network = 860833102
//! ms_per_block = 15000
//!
//! [ledger]
//! exception_policy = "stop-node"
//!
//! [logging]
//! level = "neo=debug"
//! format = "json"
//! ```

use crate::{ConfigResult, LedgerSettings, ProtocolSettings};
use neo_telemetry::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete node configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Consensus-relevant protocol parameters
    #[serde(default)]
    pub protocol: ProtocolSettings,
    /// Local tuning of the ledger actor
    #[serde(default)]
    pub ledger: LedgerSettings,
    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,
}

impl NodeConfig {
    /// Reads and validates the configuration at `path`.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let config: Self = crate::load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates an in-memory TOML document.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: Self = crate::parse_toml(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.protocol.validate()?;
        self.ledger.validate()
    }
}
