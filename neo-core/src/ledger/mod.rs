//! Ledger-side caches and the collaborator surfaces the admission pipeline queries.

mod header_cache;
mod provider;
mod verifier;

pub use header_cache::{HeaderCache, MAX_HEADERS};
pub use provider::LedgerProvider;
pub use verifier::InventoryVerifier;
