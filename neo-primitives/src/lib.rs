//! # Neo Primitives
//!
//! Fundamental types shared by every layer of the ledger core:
//! - `UInt160`: 160-bit script hash (accounts, senders)
//! - `UInt256`: 256-bit hash (transactions, blocks)
//! - `VerifyResult`: closed outcome taxonomy for every admission decision
//!
//! ## Example
//!
//! ```rust
//! use neo_primitives::{UInt160, UInt256, VerifyResult};
//!
//! let hash = UInt256::zero();
//! assert!(hash.is_zero());
//!
//! let account = UInt160::parse("0x0000000000000000000000000000000000000001").unwrap();
//! assert!(!account.is_zero());
//! assert!(VerifyResult::Succeed.is_success());
//! ```

#[macro_use]
mod macros;

pub mod constants;
pub mod error;
pub mod uint160;
pub mod uint256;
pub mod verify_result;


pub use constants::*;
pub use error::{PrimitiveError, PrimitiveResult};
pub use uint160::{UInt160, UINT160_SIZE};
pub use uint256::{UInt256, UINT256_SIZE};
pub use verify_result::VerifyResult;
