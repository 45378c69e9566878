//! Per-field value lexicons.

use bytes::Bytes;
use std::collections::HashMap;
use traildb_codec::ValueId;

/// Bidirectional mapping between raw field values and dense identifiers.
///
/// Each declared field owns one lexicon. Id 0 is reserved and always
/// denotes the empty value - it exists whether or not any event used an
/// empty value for the field, so `len()` is always the count of distinct
/// nonempty values plus one. Nonzero ids are handed out in first-appearance
/// order during the finalize scan and never change afterwards.
///
/// Matching is byte-exact with no normalization and no length limit.
///
/// Absent entries are reported as `None`; the database surface maps them to
/// the appropriate error kind with field context attached.
#[derive(Debug, Default)]
pub struct Lexicon {
    /// Values by id; `values[0]` is the empty value.
    values: Vec<Bytes>,
    /// Reverse map, including the empty value at id 0.
    ids: HashMap<Bytes, ValueId>,
}

impl Lexicon {
    /// Creates a lexicon holding only the reserved empty value.
    #[must_use]
    pub fn new() -> Self {
        let empty = Bytes::new();
        let mut ids = HashMap::new();
        ids.insert(empty.clone(), ValueId::EMPTY);
        Self {
            values: vec![empty],
            ids,
        }
    }

    /// Interns a value, returning its identifier.
    ///
    /// Idempotent: a value that was already interned keeps its original id.
    /// New nonempty values receive the next unused id.
    pub fn intern(&mut self, value: Bytes) -> ValueId {
        if let Some(&id) = self.ids.get(&value) {
            return id;
        }
        let id = ValueId::new(self.values.len() as u64);
        self.values.push(value.clone());
        self.ids.insert(value, id);
        id
    }

    /// Looks up the raw value for an identifier.
    ///
    /// Returns `None` if `id` is at or beyond the lexicon size.
    #[must_use]
    pub fn value(&self, id: ValueId) -> Option<&Bytes> {
        self.values.get(id.as_u64() as usize)
    }

    /// Looks up the identifier assigned to a value.
    ///
    /// The empty value always resolves to id 0; any other value resolves
    /// only if it was interned.
    #[must_use]
    pub fn id_of(&self, value: &[u8]) -> Option<ValueId> {
        self.ids.get(value).copied()
    }

    /// Number of identifiers, counting the reserved empty value.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.values.len() as u64
    }

    /// True when no nonempty value has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.len() == 1
    }

    /// Enumerates ids `1..len` in ascending order with their values.
    ///
    /// The reserved id 0 is skipped.
    pub fn iter(&self) -> impl Iterator<Item = (ValueId, &Bytes)> {
        self.values
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, v)| (ValueId::new(i as u64), v))
    }
}
