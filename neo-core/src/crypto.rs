//! Hash helpers used for inventory identity.

use neo_primitives::UInt256;
use sha2::{Digest, Sha256};

/// Single SHA-256 digest.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256 digest.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Merkle root over `hashes`, pairing neighbours with double SHA-256 and
/// duplicating the last node of odd-sized levels. Empty input yields zero.
pub fn compute_merkle_root(hashes: &[UInt256]) -> UInt256 {
    if hashes.is_empty() {
        return UInt256::zero();
    }

    let mut level: Vec<UInt256> = hashes.to_vec();
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| {
                let left = pair[0];
                let right = pair.get(1).copied().unwrap_or(left);
                let mut buffer = [0u8; 64];
                buffer[..32].copy_from_slice(left.as_bytes());
                buffer[32..].copy_from_slice(right.as_bytes());
                UInt256::from(hash256(&buffer))
            })
            .collect();
    }
    level[0]
}
