//! Change-tracking cache layered over a store or over another cache.

use super::{StorageItem, StorageKey, Store};
use crate::error::{CoreError, CoreResult};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Tracking state of a cached entry relative to the layer beneath.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    None,
    Added,
    Changed,
    Deleted,
}

/// Represents an entry in the cache.
#[derive(Debug, Clone)]
pub struct Trackable {
    pub item: StorageItem,
    pub state: TrackState,
}

impl Trackable {
    pub fn new(item: StorageItem, state: TrackState) -> Self {
        Self { item, state }
    }
}

enum Backing {
    Empty,
    Store(Arc<dyn Store>),
    Cache(DataCache),
}

/// A snapshot of ledger state.
///
/// Cloning a `DataCache` yields another handle to the same layer. Use
/// [`DataCache::clone_cache`] for an isolated working copy whose writes stay
/// invisible until [`DataCache::commit`] pushes them into this layer.
#[derive(Clone)]
pub struct DataCache {
    dictionary: Arc<RwLock<HashMap<StorageKey, Trackable>>>,
    change_set: Option<Arc<RwLock<HashSet<StorageKey>>>>,
    backing: Arc<Backing>,
}

impl fmt::Debug for DataCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backing = match self.backing.as_ref() {
            Backing::Empty => "empty",
            Backing::Store(_) => "store",
            Backing::Cache(_) => "cache",
        };
        f.debug_struct("DataCache")
            .field("entries", &self.dictionary.read().len())
            .field("pending", &self.pending_change_count())
            .field("backing", &backing)
            .finish()
    }
}

impl Default for DataCache {
    fn default() -> Self {
        Self::new(false)
    }
}

impl DataCache {
    /// Creates a cache with nothing beneath it.
    pub fn new(read_only: bool) -> Self {
        Self::with_backing(read_only, Backing::Empty)
    }

    /// Creates a writable cache whose commits land in `store`.
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        Self::with_backing(false, Backing::Store(store))
    }

    fn with_backing(read_only: bool, backing: Backing) -> Self {
        Self {
            dictionary: Arc::new(RwLock::new(HashMap::new())),
            change_set: (!read_only).then(|| Arc::new(RwLock::new(HashSet::new()))),
            backing: Arc::new(backing),
        }
    }

    /// Returns an isolated writable layer on top of this one.
    pub fn clone_cache(&self) -> Self {
        Self::with_backing(false, Backing::Cache(self.clone()))
    }

    pub fn is_read_only(&self) -> bool {
        self.change_set.is_none()
    }

    pub fn get(&self, key: &StorageKey) -> Option<StorageItem> {
        if let Some(trackable) = self.dictionary.read().get(key) {
            return match trackable.state {
                TrackState::Deleted => None,
                _ => Some(trackable.item.clone()),
            };
        }

        let item = self.backing_get(key)?;
        self.dictionary
            .write()
            .entry(key.clone())
            .or_insert_with(|| Trackable::new(item.clone(), TrackState::None));
        Some(item)
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.get(key).is_some()
    }

    /// Adds a new entry. Ignored with a warning on read-only caches.
    pub fn add(&self, key: StorageKey, value: StorageItem) {
        if let Err(err) = self.try_add(key, value) {
            warn!(target: "neo", %err, "attempted to add to read-only DataCache");
        }
    }

    /// Inserts or replaces an entry. Ignored with a warning on read-only caches.
    pub fn update(&self, key: StorageKey, value: StorageItem) {
        if let Err(err) = self.try_update(key, value) {
            warn!(target: "neo", %err, "attempted to update read-only DataCache");
        }
    }

    /// Removes an entry. Ignored with a warning on read-only caches.
    pub fn delete(&self, key: &StorageKey) {
        if let Err(err) = self.try_delete(key) {
            warn!(target: "neo", %err, "attempted to delete from read-only DataCache");
        }
    }

    pub fn try_add(&self, key: StorageKey, value: StorageItem) -> CoreResult<()> {
        let change_set = self.change_set.as_ref().ok_or(CoreError::ReadOnly)?;
        let existing = self.dictionary.read().get(&key).map(|t| t.state);
        let state = match existing {
            Some(TrackState::Added) => TrackState::Added,
            Some(_) => TrackState::Changed,
            None if self.backing_get(&key).is_some() => TrackState::Changed,
            None => TrackState::Added,
        };
        self.dictionary
            .write()
            .insert(key.clone(), Trackable::new(value, state));
        change_set.write().insert(key);
        Ok(())
    }

    pub fn try_update(&self, key: StorageKey, value: StorageItem) -> CoreResult<()> {
        let change_set = self.change_set.as_ref().ok_or(CoreError::ReadOnly)?;
        let exists_below =
            !self.dictionary.read().contains_key(&key) && self.backing_get(&key).is_some();
        let mut dict = self.dictionary.write();
        match dict.get_mut(&key) {
            Some(trackable) => {
                trackable.item = value;
                trackable.state = match trackable.state {
                    TrackState::Added => TrackState::Added,
                    _ => TrackState::Changed,
                };
            }
            None => {
                let state = if exists_below {
                    TrackState::Changed
                } else {
                    TrackState::Added
                };
                dict.insert(key.clone(), Trackable::new(value, state));
            }
        }
        change_set.write().insert(key);
        Ok(())
    }

    pub fn try_delete(&self, key: &StorageKey) -> CoreResult<()> {
        let change_set = self.change_set.as_ref().ok_or(CoreError::ReadOnly)?;
        let mut dict = self.dictionary.write();
        match dict.get(key).map(|t| t.state) {
            Some(TrackState::Added) => {
                // Never existed below this layer.
                dict.remove(key);
                change_set.write().remove(key);
            }
            _ => {
                dict.insert(
                    key.clone(),
                    Trackable::new(StorageItem::default(), TrackState::Deleted),
                );
                change_set.write().insert(key.clone());
            }
        }
        Ok(())
    }

    /// Live entries of contract `id` whose key starts with `prefix`, ordered by key.
    pub fn find(&self, id: i32, prefix: &[u8]) -> Vec<(StorageKey, StorageItem)> {
        let mut merged: BTreeMap<StorageKey, Option<StorageItem>> = self
            .backing_find(id, prefix)
            .into_iter()
            .map(|(key, item)| (key, Some(item)))
            .collect();
        for (key, trackable) in self.dictionary.read().iter() {
            if !key.starts_with(id, prefix) {
                continue;
            }
            let value = match trackable.state {
                TrackState::Deleted => None,
                _ => Some(trackable.item.clone()),
            };
            merged.insert(key.clone(), value);
        }
        merged
            .into_iter()
            .filter_map(|(key, item)| item.map(|item| (key, item)))
            .collect()
    }

    /// Pushes tracked changes into the layer beneath and clears them here.
    pub fn commit(&self) -> CoreResult<()> {
        let change_set = self.change_set.as_ref().ok_or(CoreError::ReadOnly)?;
        let tracked = self.tracked_items();

        match self.backing.as_ref() {
            Backing::Empty => {}
            Backing::Store(store) => {
                let batch = tracked
                    .iter()
                    .map(|(key, trackable)| {
                        let value = match trackable.state {
                            TrackState::Deleted => None,
                            _ => Some(trackable.item.value().to_vec()),
                        };
                        (key.to_array(), value)
                    })
                    .collect();
                store.write_batch(batch);
            }
            Backing::Cache(parent) => {
                for (key, trackable) in &tracked {
                    match trackable.state {
                        TrackState::Added | TrackState::Changed => {
                            parent.try_update(key.clone(), trackable.item.clone())?
                        }
                        TrackState::Deleted => parent.try_delete(key)?,
                        TrackState::None => {}
                    }
                }
            }
        }

        let mut dict = self.dictionary.write();
        dict.retain(|_, trackable| trackable.state != TrackState::Deleted);
        for trackable in dict.values_mut() {
            trackable.state = TrackState::None;
        }
        change_set.write().clear();
        Ok(())
    }

    /// Entries changed in this layer since the last commit.
    pub fn tracked_items(&self) -> Vec<(StorageKey, Trackable)> {
        let Some(change_set) = &self.change_set else {
            return Vec::new();
        };
        let dict = self.dictionary.read();
        change_set
            .read()
            .iter()
            .filter_map(|key| dict.get(key).map(|t| (key.clone(), t.clone())))
            .collect()
    }

    pub fn pending_change_count(&self) -> usize {
        self.change_set
            .as_ref()
            .map(|change_set| change_set.read().len())
            .unwrap_or(0)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.pending_change_count() > 0
    }

    fn backing_get(&self, key: &StorageKey) -> Option<StorageItem> {
        match self.backing.as_ref() {
            Backing::Empty => None,
            Backing::Store(store) => store.try_get(&key.to_array()).map(StorageItem::from_bytes),
            Backing::Cache(parent) => parent.get(key),
        }
    }

    fn backing_find(&self, id: i32, prefix: &[u8]) -> Vec<(StorageKey, StorageItem)> {
        match self.backing.as_ref() {
            Backing::Empty => Vec::new(),
            Backing::Store(store) => store
                .seek(&StorageKey::new(id, prefix.to_vec()).to_array())
                .into_iter()
                .filter_map(|(key, value)| {
                    StorageKey::from_array(&key).map(|key| (key, StorageItem::from_bytes(value)))
                })
                .collect(),
            Backing::Cache(parent) => parent.find(id, prefix),
        }
    }
}
