//! Inventory payloads admitted by the ledger.

mod block;
mod extensible_payload;
mod header;
mod inventory;
mod signer;
mod transaction;
mod transaction_attribute;
mod witness;

pub use block::Block;
pub use extensible_payload::ExtensiblePayload;
pub use header::Header;
pub use inventory::{Inventory, InventoryType};
pub use signer::{Signer, WitnessScope};
pub use transaction::{Transaction, HEADER_SIZE, MAX_TRANSACTION_SIZE};
pub use transaction_attribute::{TransactionAttribute, TransactionAttributeType};
pub use witness::Witness;
