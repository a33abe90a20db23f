//! Ordered key-value substrate.
//!
//! The keeper never talks to a concrete database. It writes byte keys into a
//! [`KvStore`] and relies on the store returning prefix scans in key order, so a
//! namespace plus a big-endian composite key gives contiguous per-position ranges.

use std::collections::BTreeMap;

pub trait KvStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>);

    // no-op when the key is absent
    fn delete(&mut self, key: &[u8]);

    /// Lazily yields every entry whose key starts with `prefix`, in ascending key order.
    fn prefix_iter<'a>(
        &'a self,
        prefix: &[u8],
    ) -> Box<dyn Iterator<Item = (&'a [u8], &'a [u8])> + 'a>;
}

/// In-memory store backed by a `BTreeMap`. Ordering comes for free.
#[derive(Debug, Clone, Default)]
pub struct MemStore {
    entries: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KvStore for MemStore {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.entries.insert(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.entries.remove(key);
    }

    fn prefix_iter<'a>(
        &'a self,
        prefix: &[u8],
    ) -> Box<dyn Iterator<Item = (&'a [u8], &'a [u8])> + 'a> {
        let prefix = prefix.to_vec();
        Box::new(
            self.entries
                .range(prefix.clone()..)
                .take_while(move |(k, _)| k.starts_with(&prefix))
                .map(|(k, v)| (k.as_slice(), v.as_slice())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_delete() {
        let mut store = MemStore::new();
        store.set(vec![1, 2], vec![9]);
        assert_eq!(store.get(&[1, 2]), Some(vec![9]));

        store.delete(&[1, 2]);
        assert_eq!(store.get(&[1, 2]), None);

        // deleting again is fine
        store.delete(&[1, 2]);
        assert!(store.is_empty());
    }

    #[test]
    fn prefix_scan_is_ordered_and_bounded() {
        let mut store = MemStore::new();
        store.set(vec![3, 0, 2], vec![2]);
        store.set(vec![3, 0, 1], vec![1]);
        store.set(vec![3, 1, 0], vec![3]);
        store.set(vec![2, 9, 9], vec![0]);

        let values: Vec<u8> = store.prefix_iter(&[3, 0]).map(|(_, v)| v[0]).collect();
        assert_eq!(values, vec![1, 2]);

        assert_eq!(store.prefix_iter(&[3]).count(), 3);
        assert_eq!(store.prefix_iter(&[4]).count(), 0);
    }
}
