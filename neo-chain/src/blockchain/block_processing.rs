//
// block_processing.rs - Block admission and in-order persistence
//

use super::unverified::Buffered;
use super::*;
use crate::collaborators::PeerId;
use neo_core::network::payloads::Header;
use neo_primitives::VerifyResult;
use tracing::{debug, trace, warn};

impl Blockchain {
    pub(super) fn on_new_block(
        &mut self,
        block: &Block,
        sender: Option<PeerId>,
    ) -> ChainResult<VerifyResult> {
        let snapshot = self.snapshot();
        let current_height = self.ledger.current_index(&snapshot);
        let header_height = self.header_height(current_height);
        let block_index = block.index();
        let hash = block.hash();

        if block_index <= current_height {
            return Ok(VerifyResult::AlreadyExists);
        }

        if block_index - 1 > header_height {
            self.add_unverified_block(block.clone(), sender);
            return Ok(VerifyResult::UnableToVerify);
        }

        if block_index == header_height + 1 {
            let verified = self
                .previous_header(&snapshot, block_index)
                .is_some_and(|prev| {
                    block.verify(&prev, &self.settings, &snapshot, self.verifier.as_ref())
                });
            if !verified {
                warn!(
                    target: "neo",
                    index = block_index,
                    %hash,
                    prev = %block.prev_hash(),
                    "block verification failed"
                );
                return Ok(VerifyResult::Invalid);
            }
        } else {
            let matches_header = self
                .header_cache
                .get(block_index)
                .is_some_and(|header| header.hash() == hash);
            if !matches_header || block.compute_merkle_root() != block.header.merkle_root {
                warn!(
                    target: "neo",
                    index = block_index,
                    %hash,
                    "block does not match cached header"
                );
                return Ok(VerifyResult::Invalid);
            }
        }

        self.block_cache.entry(hash).or_insert_with(|| block.clone());

        if block_index == current_height + 1 {
            self.persist_block_sequence(block.clone(), header_height)?;
        } else {
            if block_index.saturating_add(self.ledger_settings.relay_window) >= header_height {
                self.network.relay_directly(block.clone().into());
            }
            if block_index == header_height + 1 {
                self.header_cache.push_back(block.header.clone());
            }
            debug!(target: "neo", index = block_index, %hash, "block cached ahead of persisted height");
        }
        Ok(VerifyResult::Succeed)
    }

    /// Header of `index - 1`, from the header cache or the ledger.
    pub(super) fn previous_header(&self, snapshot: &DataCache, index: u32) -> Option<Header> {
        let prev_index = index.checked_sub(1)?;
        self.header_cache
            .get(prev_index)
            .or_else(|| self.ledger.get_header(snapshot, prev_index))
    }

    fn add_unverified_block(&mut self, block: Block, sender: Option<PeerId>) {
        let index = block.index();
        let list = self
            .block_cache_unverified
            .entry(index)
            .or_insert_with(UnverifiedBlocksList::new);
        match list.offer(block, sender) {
            Buffered::Added => trace!(target: "neo", index, "block buffered until its predecessor arrives"),
            Buffered::Duplicate => {}
            Buffered::Equivocation(peer) => {
                warn!(
                    target: "neo",
                    index,
                    %peer,
                    "peer proposed two different blocks at one height; disconnecting"
                );
                self.network.abort_peer(peer);
            }
        }
    }

    /// Persists `block` and every cached successor the header cache links to.
    ///
    /// Only the last few blocks of the run are relayed, and only when they are
    /// close to the header tip.
    fn persist_block_sequence(&mut self, block: Block, header_height: u32) -> ChainResult<()> {
        let mut next_index = block.index().saturating_add(1);
        let mut blocks_to_persist = vec![block];
        while next_index <= header_height {
            let Some(header) = self.header_cache.get(next_index) else {
                break;
            };
            let Some(next_block) = self.block_cache.get(&header.hash()) else {
                break;
            };
            blocks_to_persist.push(next_block.clone());
            next_index = next_index.saturating_add(1);
        }

        let relay_count = self
            .ledger_settings
            .blocks_to_relay(self.settings.ms_per_block) as usize;
        let skip = blocks_to_persist.len().saturating_sub(relay_count);
        for (position, block) in blocks_to_persist.iter().enumerate() {
            self.block_cache_unverified.remove(&block.index());
            self.persist(block)?;
            if position < skip {
                continue;
            }
            if block.index().saturating_add(self.ledger_settings.relay_window) >= header_height {
                self.network.relay_directly(block.clone().into());
            }
        }

        if let Some(unverified) = self.block_cache_unverified.remove(&next_index) {
            debug!(
                target: "neo",
                index = next_index,
                candidates = unverified.blocks.len(),
                "replaying buffered blocks"
            );
            for block in unverified.blocks {
                self.pending.push_back(BlockchainCommand::InventoryBlock {
                    block,
                    sender: None,
                    reply: None,
                });
            }
        }
        Ok(())
    }
}
