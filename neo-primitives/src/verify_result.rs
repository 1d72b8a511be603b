//! Verification result taxonomy.
//!
//! Every admission decision made by the ledger core (blocks, transactions,
//! headers, extensible payloads) reports one of these outcomes. Callers
//! branch on the value; ordinary rejections are never raised as errors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of verifying or admitting an inventory item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VerifyResult {
    /// The verification was successful.
    Succeed = 0,
    /// An inventory with the same hash already exists on chain.
    AlreadyExists = 1,
    /// An inventory with the same hash already exists in the memory pool.
    AlreadyInPool = 2,
    /// The memory pool is full and the transaction ranks too low to enter.
    OutOfMemory = 3,
    /// The previous block has not been received, so the block cannot be verified.
    UnableToVerify = 4,
    /// The inventory is invalid.
    Invalid = 5,
    /// The transaction has an invalid script.
    InvalidScript = 6,
    /// The transaction has an invalid attribute.
    InvalidAttribute = 7,
    /// The inventory has an invalid signature.
    InvalidSignature = 8,
    /// The size of the inventory is not allowed.
    OverSize = 9,
    /// The transaction has expired.
    Expired = 10,
    /// The sender cannot pay the fees of the transaction.
    InsufficientFunds = 11,
    /// The transaction does not comply with the policy.
    PolicyFail = 12,
    /// The transaction conflicts with on-chain or pooled transactions.
    HasConflicts = 13,
    /// The inventory failed to verify for other reasons.
    #[default]
    Unknown = 14,
}

impl VerifyResult {
    /// Returns true only for [`VerifyResult::Succeed`].
    #[inline]
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Succeed)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Succeed => "Succeed",
            Self::AlreadyExists => "AlreadyExists",
            Self::AlreadyInPool => "AlreadyInPool",
            Self::OutOfMemory => "OutOfMemory",
            Self::UnableToVerify => "UnableToVerify",
            Self::Invalid => "Invalid",
            Self::InvalidScript => "InvalidScript",
            Self::InvalidAttribute => "InvalidAttribute",
            Self::InvalidSignature => "InvalidSignature",
            Self::OverSize => "OverSize",
            Self::Expired => "Expired",
            Self::InsufficientFunds => "InsufficientFunds",
            Self::PolicyFail => "PolicyFail",
            Self::HasConflicts => "HasConflicts",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<u8> for VerifyResult {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Succeed,
            1 => Self::AlreadyExists,
            2 => Self::AlreadyInPool,
            3 => Self::OutOfMemory,
            4 => Self::UnableToVerify,
            5 => Self::Invalid,
            6 => Self::InvalidScript,
            7 => Self::InvalidAttribute,
            8 => Self::InvalidSignature,
            9 => Self::OverSize,
            10 => Self::Expired,
            11 => Self::InsufficientFunds,
            12 => Self::PolicyFail,
            13 => Self::HasConflicts,
            _ => Self::Unknown,
        }
    }
}

impl From<VerifyResult> for u8 {
    fn from(result: VerifyResult) -> Self {
        result as u8
    }
}

impl fmt::Display for VerifyResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_conversion_roundtrips_known_values() {
        for byte in 0u8..=14 {
            let result = VerifyResult::from(byte);
            assert_eq!(u8::from(result), byte);
        }
        assert_eq!(VerifyResult::from(200), VerifyResult::Unknown);
    }

    #[test]
    fn only_succeed_is_success() {
        assert!(VerifyResult::Succeed.is_success());
        assert!(!VerifyResult::AlreadyInPool.is_success());
        assert_eq!(VerifyResult::default(), VerifyResult::Unknown);
        assert_eq!(VerifyResult::HasConflicts.to_string(), "HasConflicts");
    }
}
