use crate::network::payloads::Header;
use neo_primitives::MAX_HEADER_CACHE_SIZE;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Maximum number of headers held ahead of the persisted chain.
pub const MAX_HEADERS: usize = MAX_HEADER_CACHE_SIZE;

/// Headers received ahead of their blocks, oldest first.
///
/// Readers may query from any thread. Only the ledger actor mutates it.
#[derive(Debug, Default)]
pub struct HeaderCache {
    headers: RwLock<VecDeque<Header>>,
}

impl HeaderCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the header at absolute chain `index`, or `None` outside the cached window.
    pub fn get(&self, index: u32) -> Option<Header> {
        let headers = self.headers.read();
        let first = headers.front()?.index;
        let offset = index.checked_sub(first)? as usize;
        headers.get(offset).cloned()
    }

    pub fn len(&self) -> usize {
        self.headers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.read().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= MAX_HEADERS
    }

    pub fn first_index(&self) -> Option<u32> {
        self.headers.read().front().map(|header| header.index)
    }

    /// Gets the newest cached header.
    pub fn last(&self) -> Option<Header> {
        self.headers.read().back().cloned()
    }

    /// Appends a header. Returns `false` without inserting when the cache is full.
    pub fn push_back(&self, header: Header) -> bool {
        let mut headers = self.headers.write();
        if headers.len() >= MAX_HEADERS {
            return false;
        }
        headers.push_back(header);
        true
    }

    pub fn pop_front(&self) -> Option<Header> {
        self.headers.write().pop_front()
    }

    /// Removes the oldest header only if it sits at `index`.
    ///
    /// On a mismatch the cache is left untouched and the front index is returned.
    pub fn pop_front_expected(&self, index: u32) -> Result<Option<Header>, u32> {
        let mut headers = self.headers.write();
        match headers.front() {
            Some(front) if front.index != index => Err(front.index),
            _ => Ok(headers.pop_front()),
        }
    }

    /// Copy of the cached headers, oldest first.
    pub fn iter(&self) -> std::vec::IntoIter<Header> {
        self.headers
            .read()
            .iter()
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
    }
}
