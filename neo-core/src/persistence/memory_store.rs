use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Durable key-value backend beneath the outermost [`DataCache`](super::DataCache).
pub trait Store: Send + Sync {
    fn try_get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn contains(&self, key: &[u8]) -> bool {
        self.try_get(key).is_some()
    }

    /// Entries whose key starts with `prefix`, in ascending key order.
    fn seek(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)>;

    /// Applies a batch of writes atomically. `None` deletes the key.
    fn write_batch(&self, batch: Vec<(Vec<u8>, Option<Vec<u8>>)>);
}

/// An in-memory [`Store`] over an ordered map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn try_get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.inner.read().get(key).cloned()
    }

    fn seek(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.inner
            .read()
            .range(prefix.to_vec()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    fn write_batch(&self, batch: Vec<(Vec<u8>, Option<Vec<u8>>)>) {
        let mut inner = self.inner.write();
        for (key, value) in batch {
            match value {
                Some(value) => {
                    inner.insert(key, value);
                }
                None => {
                    inner.remove(&key);
                }
            }
        }
    }
}
