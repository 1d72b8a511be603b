//! Layered key-value state used for block execution.

mod data_cache;
mod memory_store;
mod storage;

pub use data_cache::{DataCache, TrackState, Trackable};
pub use memory_store::{MemoryStore, Store};
pub use storage::{StorageItem, StorageKey};
