//! Protocol constants shared across the ledger core.

/// Size of a script hash in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Size of a transaction or block hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Maximum serialized size of a transaction.
pub const MAX_TRANSACTION_SIZE: usize = 102_400;

/// Maximum number of attributes a transaction may carry.
pub const MAX_TRANSACTION_ATTRIBUTES: usize = 16;

/// Maximum number of headers kept ahead of the persisted tip.
pub const MAX_HEADER_CACHE_SIZE: usize = 10_000;

/// Number of unverified pool entries re-checked on each idle tick.
pub const MAX_TX_TO_REVERIFY_PER_IDLE: usize = 10;

/// One GAS expressed in datoshi.
pub const GAS_FACTOR: i64 = 100_000_000;

/// Timestamp of the genesis block in milliseconds since the Unix epoch.
pub const GENESIS_TIMESTAMP: u64 = 1_468_595_301_000;

/// Nonce of the genesis block.
pub const GENESIS_NONCE: u64 = 2_083_236_893;
