// Copyright (C) 2015-2025 The Neo Project.
//
// transaction.rs file belongs to the neo project and is free
// software distributed under the MIT software license, see the
// accompanying file LICENSE in the main directory of the
// repository or http://www.opensource.org/licenses/mit-license.php
// for more details.
//
// Redistribution and use in source and binary forms with or without
// modifications are permitted.

use super::{Signer, TransactionAttribute, Witness};
use crate::crypto::sha256;
use crate::io::{BinaryWriter, Serializable};
use crate::ledger::InventoryVerifier;
use neo_config::ProtocolSettings;
use neo_primitives::{UInt160, UInt256, VerifyResult, MAX_TRANSACTION_ATTRIBUTES};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// The maximum size of a transaction.
pub const MAX_TRANSACTION_SIZE: usize = neo_primitives::MAX_TRANSACTION_SIZE;

/// The size of a transaction header: version, nonce, system fee,
/// network fee and valid-until-block.
pub const HEADER_SIZE: usize = 1 + 4 + 8 + 8 + 4;

/// Represents a transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u8,
    pub nonce: u32,
    /// The system fee of the transaction, in datoshi.
    pub system_fee: i64,
    /// The network fee of the transaction, in datoshi.
    pub network_fee: i64,
    /// The block height up to which the transaction is valid (exclusive).
    pub valid_until_block: u32,
    /// Signers of the transaction. The first one is the sender.
    pub signers: Vec<Signer>,
    pub attributes: Vec<TransactionAttribute>,
    pub script: Vec<u8>,
    pub witnesses: Vec<Witness>,
}

impl Transaction {
    /// Hash of the unsigned encoding; witnesses do not contribute.
    pub fn hash(&self) -> UInt256 {
        let mut writer = BinaryWriter::new();
        self.serialize_unsigned(&mut writer);
        UInt256::from(sha256(writer.as_bytes()))
    }

    /// The account paying the fees. Zero when the transaction has no signers.
    pub fn sender(&self) -> UInt160 {
        self.signers
            .first()
            .map(|signer| signer.account)
            .unwrap_or_default()
    }

    pub fn signer_accounts(&self) -> Vec<UInt160> {
        self.signers.iter().map(|signer| signer.account).collect()
    }

    /// System fee plus network fee.
    pub fn fee(&self) -> i64 {
        self.system_fee.saturating_add(self.network_fee)
    }

    /// Network fee divided by the encoded size.
    pub fn fee_per_byte(&self) -> i64 {
        let size = self.size().max(1) as i64;
        self.network_fee / size
    }

    pub fn is_high_priority(&self) -> bool {
        self.attributes
            .iter()
            .any(|attribute| matches!(attribute, TransactionAttribute::HighPriority))
    }

    /// Hashes named by Conflicts attributes.
    pub fn conflicts(&self) -> impl Iterator<Item = &UInt256> + '_ {
        self.attributes.iter().filter_map(|attribute| match attribute {
            TransactionAttribute::Conflicts { hash } => Some(hash),
            _ => None,
        })
    }

    pub fn oracle_response_id(&self) -> Option<u64> {
        self.attributes.iter().find_map(|attribute| match attribute {
            TransactionAttribute::OracleResponse { id, .. } => Some(*id),
            _ => None,
        })
    }

    /// Whether the transaction can no longer be included on top of `height`.
    pub fn is_expired_at(&self, height: u32, settings: &ProtocolSettings) -> bool {
        self.valid_until_block <= height
            || u64::from(self.valid_until_block)
                > u64::from(height) + u64::from(settings.max_valid_until_block_increment)
    }

    /// Attribute rules that depend on the chain height.
    pub fn verify_attributes(&self, height: u32) -> VerifyResult {
        let own_hash = self.hash();
        for attribute in &self.attributes {
            match attribute {
                TransactionAttribute::NotValidBefore { height: not_before }
                    if *not_before > height.saturating_add(1) =>
                {
                    return VerifyResult::InvalidAttribute;
                }
                TransactionAttribute::Conflicts { hash } if *hash == own_hash => {
                    return VerifyResult::InvalidAttribute;
                }
                _ => {}
            }
        }
        VerifyResult::Succeed
    }

    /// Checks that need no ledger state. Safe to run off the ledger actor.
    pub fn verify_state_independent(
        &self,
        settings: &ProtocolSettings,
        verifier: &dyn InventoryVerifier,
    ) -> VerifyResult {
        if self.size() > MAX_TRANSACTION_SIZE {
            return VerifyResult::OverSize;
        }
        if self.script.is_empty() {
            return VerifyResult::InvalidScript;
        }
        if self.signers.is_empty() || self.witnesses.len() != self.signers.len() {
            return VerifyResult::Invalid;
        }
        let mut accounts = HashSet::with_capacity(self.signers.len());
        if !self.signers.iter().all(|signer| accounts.insert(signer.account)) {
            return VerifyResult::Invalid;
        }
        if self.attributes.len() + self.signers.len() > MAX_TRANSACTION_ATTRIBUTES {
            return VerifyResult::Invalid;
        }
        let mut seen = HashSet::new();
        for attribute in &self.attributes {
            if !attribute.allow_multiple() && !seen.insert(attribute.attribute_type()) {
                return VerifyResult::InvalidAttribute;
            }
        }
        verifier.verify_state_independent(self, settings)
    }

    fn serialize_unsigned(&self, writer: &mut BinaryWriter) {
        writer.write_u8(self.version);
        writer.write_u32(self.nonce);
        writer.write_i64(self.system_fee);
        writer.write_i64(self.network_fee);
        writer.write_u32(self.valid_until_block);
        writer.write_serializable_list(&self.signers);
        writer.write_serializable_list(&self.attributes);
        writer.write_var_bytes(&self.script);
    }
}

impl Serializable for Transaction {
    fn serialize(&self, writer: &mut BinaryWriter) {
        self.serialize_unsigned(writer);
        writer.write_serializable_list(&self.witnesses);
    }
}
