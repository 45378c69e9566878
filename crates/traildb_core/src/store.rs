//! The trail store: encoded events by trail identifier.

use crate::types::{TrailId, Timestamp};
use traildb_codec::Item;

/// One stored event: a timestamp and one packed item per declared field,
/// in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedEvent {
    /// Event time.
    pub time: Timestamp,
    /// Exactly one item per declared field.
    pub items: Vec<Item>,
}

/// Read-only store of every trail's time-ordered events.
///
/// Built once at finalize, after the key index and lexicons exist; position
/// in the outer vector is the trail id.
#[derive(Debug, Default)]
pub struct TrailStore {
    trails: Vec<Vec<EncodedEvent>>,
}

impl TrailStore {
    /// Wraps finalized per-trail event lists.
    #[must_use]
    pub fn new(trails: Vec<Vec<EncodedEvent>>) -> Self {
        Self { trails }
    }

    /// Number of trails stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trails.len()
    }

    /// True when no trails are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    /// The time-ordered events of one trail.
    ///
    /// Returns `None` for a trail id at or beyond `len()`.
    #[must_use]
    pub fn events_of(&self, id: TrailId) -> Option<&[EncodedEvent]> {
        self.trails.get(id.as_usize()).map(Vec::as_slice)
    }

    /// Total event count across all trails.
    #[must_use]
    pub fn num_events(&self) -> u64 {
        self.trails.iter().map(|t| t.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use traildb_codec::{FieldId, ValueId};

    fn event(time: Timestamp, value: u64) -> EncodedEvent {
        EncodedEvent {
            time,
            items: vec![Item::pack(FieldId::new(1), ValueId::new(value))],
        }
    }

    #[test]
    fn events_by_trail_id() {
        let store = TrailStore::new(vec![
            vec![event(1, 1), event(2, 2)],
            vec![event(5, 1)],
        ]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.events_of(TrailId::new(0)).unwrap().len(), 2);
        assert_eq!(store.events_of(TrailId::new(1)).unwrap(), &[event(5, 1)]);
        assert_eq!(store.num_events(), 3);
    }

    #[test]
    fn out_of_range_trail_misses() {
        let store = TrailStore::new(vec![vec![event(1, 1)]]);
        assert_eq!(store.events_of(TrailId::new(1)), None);
    }

    #[test]
    fn empty_store() {
        let store = TrailStore::default();
        assert!(store.is_empty());
        assert_eq!(store.num_events(), 0);
    }
}
