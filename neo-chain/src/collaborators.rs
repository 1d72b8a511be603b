//! Outbound surfaces of the ledger actor: peer relay and sync progress.

use neo_core::network::payloads::{Header, Inventory};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the remote peer an inventory item arrived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub u64);

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}

/// Fire-and-forget access to the peer-to-peer layer.
pub trait NetworkChannel: Send + Sync {
    /// Broadcasts `inventory` to connected peers.
    fn relay_directly(&self, inventory: Inventory);

    /// Closes the connection to a misbehaving peer.
    fn abort_peer(&self, peer: PeerId);
}

/// Receives header batches accepted into the header cache.
pub trait SyncObserver: Send + Sync {
    fn on_headers(&self, headers: &[Header]);
}

/// Collaborator that drops everything, for nodes running without a network.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl NetworkChannel for Detached {
    fn relay_directly(&self, _inventory: Inventory) {}

    fn abort_peer(&self, _peer: PeerId) {}
}

impl SyncObserver for Detached {
    fn on_headers(&self, _headers: &[Header]) {}
}
