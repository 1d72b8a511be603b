use crate::error::CoreResult;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Key of a contract storage entry: contract id plus raw key bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StorageKey {
    pub id: i32,
    pub key: Vec<u8>,
}

impl StorageKey {
    pub fn new(id: i32, key: Vec<u8>) -> Self {
        Self { id, key }
    }

    /// Key for `id` whose suffix is a single prefix byte followed by `suffix`.
    pub fn with_prefix(id: i32, prefix: u8, suffix: &[u8]) -> Self {
        let mut key = Vec::with_capacity(1 + suffix.len());
        key.push(prefix);
        key.extend_from_slice(suffix);
        Self { id, key }
    }

    /// Flat encoding used by stores: little-endian id then the key bytes.
    pub fn to_array(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(4 + self.key.len());
        bytes.extend_from_slice(&self.id.to_le_bytes());
        bytes.extend_from_slice(&self.key);
        bytes
    }

    pub fn from_array(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }
        let (id, key) = bytes.split_at(4);
        let id = i32::from_le_bytes([id[0], id[1], id[2], id[3]]);
        Some(Self::new(id, key.to_vec()))
    }

    pub fn starts_with(&self, id: i32, prefix: &[u8]) -> bool {
        self.id == id && self.key.starts_with(prefix)
    }
}

/// Value of a contract storage entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageItem {
    value: Vec<u8>,
}

impl StorageItem {
    pub fn from_bytes(value: Vec<u8>) -> Self {
        Self { value }
    }

    /// Encodes `value` with bincode.
    pub fn from_value<T: Serialize>(value: &T) -> CoreResult<Self> {
        Ok(Self::from_bytes(bincode::serialize(value)?))
    }

    /// Decodes the stored bytes with bincode.
    pub fn to_value<T: DeserializeOwned>(&self) -> CoreResult<T> {
        Ok(bincode::deserialize(&self.value)?)
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_encoding_roundtrips() {
        let key = StorageKey::with_prefix(-4, 0x05, &[1, 2, 3]);
        let bytes = key.to_array();
        assert_eq!(&bytes[..4], &(-4i32).to_le_bytes());
        assert_eq!(StorageKey::from_array(&bytes), Some(key));
        assert_eq!(StorageKey::from_array(&[1, 2]), None);
    }

    #[test]
    fn item_value_roundtrips_through_bincode() {
        let item = StorageItem::from_value(&(7u32, "gas".to_string())).unwrap();
        let decoded: (u32, String) = item.to_value().unwrap();
        assert_eq!(decoded, (7, "gas".to_string()));
    }
}
