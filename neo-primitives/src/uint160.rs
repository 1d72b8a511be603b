//! Implementation of `UInt160`, the 160-bit script hash.

use crate::constants::ADDRESS_SIZE;

/// The length of `UInt160` values in bytes.
pub const UINT160_SIZE: usize = ADDRESS_SIZE;

fixed_hash! {
    /// A 160-bit script hash identifying an account or contract.
    UInt160, UINT160_SIZE
}
