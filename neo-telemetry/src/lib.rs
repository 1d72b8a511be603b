//! # Neo Telemetry
//!
//! Structured logging for the ledger core. Library crates only emit
//! `tracing` events; binaries and tests call [`init_logging`] once to
//! install a subscriber.

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{init_logging, LogConfig, LogFormat};
