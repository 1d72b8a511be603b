use crate::network::payloads::{ExtensiblePayload, Header, Transaction};
use crate::persistence::DataCache;
use neo_config::ProtocolSettings;
use neo_primitives::VerifyResult;

/// Witness and policy checks delegated to the script executor and native contracts.
pub trait InventoryVerifier: Send + Sync {
    /// Signature checks that need no ledger state.
    fn verify_state_independent(
        &self,
        _tx: &Transaction,
        _settings: &ProtocolSettings,
    ) -> VerifyResult {
        VerifyResult::Succeed
    }

    /// Policy, fee floor and witness checks against `snapshot`.
    fn verify_state_dependent(
        &self,
        tx: &Transaction,
        settings: &ProtocolSettings,
        snapshot: &DataCache,
    ) -> VerifyResult;

    /// Consensus witness of a header.
    fn verify_header_witness(
        &self,
        header: &Header,
        settings: &ProtocolSettings,
        snapshot: &DataCache,
    ) -> bool;

    fn verify_extensible_witness(
        &self,
        payload: &ExtensiblePayload,
        settings: &ProtocolSettings,
        snapshot: &DataCache,
    ) -> bool;
}
