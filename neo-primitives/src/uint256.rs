//! Implementation of `UInt256`, the 256-bit hash used for blocks and transactions.

use crate::constants::HASH_SIZE;

/// The length of `UInt256` values in bytes.
pub const UINT256_SIZE: usize = HASH_SIZE;

fixed_hash! {
    /// A 256-bit hash identifying a block, header or transaction.
    UInt256, UINT256_SIZE
}
