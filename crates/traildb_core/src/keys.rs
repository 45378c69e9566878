//! The UUID index: keys to dense trail identifiers.

use crate::key::TrailKey;
use crate::types::TrailId;
use std::collections::HashMap;

/// Bijection between trail keys and dense trail identifiers.
///
/// Built once at finalize from the distinct staged keys, sorted ascending
/// by byte value; a key's trail id is its position in that order. Total
/// over `0..len()` in both directions.
#[derive(Debug, Default)]
pub struct KeyIndex {
    /// Keys in ascending byte order; position = trail id.
    sorted: Vec<TrailKey>,
    /// Reverse lookup.
    by_key: HashMap<TrailKey, TrailId>,
}

impl KeyIndex {
    /// Builds the index from keys already in ascending order.
    ///
    /// The finalize pipeline stages trails in a `BTreeMap`, so its key set
    /// arrives sorted and distinct.
    #[must_use]
    pub fn from_sorted(sorted: Vec<TrailKey>) -> Self {
        debug_assert!(sorted.windows(2).all(|w| w[0] < w[1]));
        let by_key = sorted
            .iter()
            .enumerate()
            .map(|(i, &key)| (key, TrailId::new(i as u32)))
            .collect();
        Self { sorted, by_key }
    }

    /// Number of trails indexed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    /// True when the index holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Looks up the trail id assigned to a key.
    #[must_use]
    pub fn trail_id_of(&self, key: &TrailKey) -> Option<TrailId> {
        self.by_key.get(key).copied()
    }

    /// Looks up the key assigned to a trail id.
    #[must_use]
    pub fn key_of(&self, id: TrailId) -> Option<&TrailKey> {
        self.sorted.get(id.as_usize())
    }

    /// Containment test; never fails.
    #[must_use]
    pub fn contains(&self, key: &TrailKey) -> bool {
        self.by_key.contains_key(key)
    }

    /// Keys in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &TrailKey> {
        self.sorted.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keys() -> Vec<TrailKey> {
        let mut keys = vec![
            TrailKey::from_slice(b"mno").unwrap(),
            TrailKey::from_slice(b"abc").unwrap(),
            TrailKey::from_slice(b"xyz").unwrap(),
        ];
        keys.sort();
        keys
    }

    #[test]
    fn assigns_ids_in_sort_order() {
        let keys = sample_keys();
        let index = KeyIndex::from_sorted(keys.clone());

        assert_eq!(index.len(), 3);
        for (i, key) in keys.iter().enumerate() {
            assert_eq!(index.trail_id_of(key), Some(TrailId::new(i as u32)));
            assert_eq!(index.key_of(TrailId::new(i as u32)), Some(key));
        }
    }

    #[test]
    fn bijection_round_trips() {
        let index = KeyIndex::from_sorted(sample_keys());
        for id in 0..index.len() as u32 {
            let id = TrailId::new(id);
            let key = *index.key_of(id).unwrap();
            assert_eq!(index.trail_id_of(&key), Some(id));
        }
    }

    #[test]
    fn unknown_key_and_id_miss() {
        let index = KeyIndex::from_sorted(sample_keys());
        let unseen = TrailKey::from_slice(b"not there").unwrap();

        assert_eq!(index.trail_id_of(&unseen), None);
        assert!(!index.contains(&unseen));
        assert_eq!(index.key_of(TrailId::new(3)), None);
    }

    #[test]
    fn empty_index() {
        let index = KeyIndex::default();
        assert!(index.is_empty());
        assert_eq!(index.key_of(TrailId::new(0)), None);
    }
}
