//! # Neo Config
//!
//! Settings consumed by the ledger core:
//!
//! - [`ProtocolSettings`]: consensus-relevant parameters that must match
//!   across every node of a network
//! - [`LedgerSettings`]: local tuning of the ledger actor (relay throttle,
//!   re-verification batches, mailbox sizes, extension policy)
//! - [`NodeConfig`]: both of the above plus logging, read from one file
//!
//! Both deserialize from TOML with per-field defaults, so a partial file is
//! always valid.

mod error;
mod ledger;
mod node;
mod protocol;

pub use error::{ConfigError, ConfigResult};
pub use ledger::{LedgerSettings, UnhandledExceptionPolicy};
pub use node::NodeConfig;
pub use protocol::ProtocolSettings;

use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads and deserializes a TOML document from disk.
pub fn load_toml<T: DeserializeOwned>(path: impl AsRef<Path>) -> ConfigResult<T> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tracing::debug!(target: "neo", path = %path.display(), "loading configuration file");
    parse_toml(&contents)
}

/// Deserializes a TOML document held in memory.
pub fn parse_toml<T: DeserializeOwned>(contents: &str) -> ConfigResult<T> {
    toml::from_str(contents).map_err(|err| ConfigError::Parse(err.to_string()))
}
