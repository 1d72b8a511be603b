use crate::collaborators::PeerId;
use neo_core::network::payloads::Block;
use std::collections::HashSet;

/// Candidate blocks for one height whose predecessor is still unknown.
#[derive(Debug, Default)]
pub(crate) struct UnverifiedBlocksList {
    pub(crate) blocks: Vec<Block>,
    pub(crate) nodes: HashSet<PeerId>,
}

/// What happened to a block offered to an [`UnverifiedBlocksList`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Buffered {
    Added,
    Duplicate,
    /// The sender already proposed a different block at this height.
    Equivocation(PeerId),
}

impl UnverifiedBlocksList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Buffers `block` unless its hash is already present or `sender`
    /// already proposed another block for the same height.
    pub(crate) fn offer(&mut self, block: Block, sender: Option<PeerId>) -> Buffered {
        let hash = block.hash();
        if self.blocks.iter().any(|candidate| candidate.hash() == hash) {
            return Buffered::Duplicate;
        }
        if let Some(peer) = sender {
            if !self.nodes.insert(peer) {
                return Buffered::Equivocation(peer);
            }
        }
        self.blocks.push(block);
        Buffered::Added
    }
}
