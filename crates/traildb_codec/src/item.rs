//! Packed (field, value-id) items.

use crate::types::{FieldId, ValueId};
use std::fmt;

/// Number of low bits holding the field index.
const FIELD_BITS: u32 = 16;

/// Mask extracting the field index from a packed item.
const FIELD_MASK: u64 = (1 << FIELD_BITS) - 1;

/// Largest value identifier a packed item can carry.
pub const MAX_VALUE_ID: u64 = (1 << (64 - FIELD_BITS)) - 1;

/// A single field value of one event, packed into a `u64`.
///
/// The field index occupies the low 16 bits and the value identifier the
/// high 48 bits. The split supports 65 535 declared fields and close to
/// 2^48 distinct values per field, far beyond what a database with dense
/// `u32` trail identifiers can produce.
///
/// Packing is a pure bit transform: unpacking never fails, and any bit
/// pattern decomposes into *some* (field, value-id) pair. Whether that pair
/// is meaningful - the field exists, the value id is inside that field's
/// lexicon - is checked by the lexicon and query layers, not here.
///
/// Item 0 only arises as `(time field, empty value)`, a pairing the store
/// never produces: stored items always carry a declared field index of 1 or
/// higher.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item(u64);

impl Item {
    /// Packs a field index and value identifier into one item.
    ///
    /// Value identifiers above [`MAX_VALUE_ID`] do not occur in practice
    /// (lexicons are bounded by event count); the high bits are masked off
    /// to keep the transform total.
    #[must_use]
    pub const fn pack(field: FieldId, value: ValueId) -> Self {
        Self(((value.as_u64() & MAX_VALUE_ID) << FIELD_BITS) | (field.as_u32() as u64 & FIELD_MASK))
    }

    /// Unpacks the field index.
    #[must_use]
    pub const fn field(self) -> FieldId {
        FieldId::new((self.0 & FIELD_MASK) as u32)
    }

    /// Unpacks the value identifier.
    #[must_use]
    pub const fn value_id(self) -> ValueId {
        ValueId::new(self.0 >> FIELD_BITS)
    }

    /// Returns the raw packed word.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Reinterprets a raw word as an item.
    #[must_use]
    pub const fn from_u64(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Item({}, {})", self.field(), self.value_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pack_unpack() {
        let item = Item::pack(FieldId::new(3), ValueId::new(41));
        assert_eq!(item.field(), FieldId::new(3));
        assert_eq!(item.value_id(), ValueId::new(41));
    }

    #[test]
    fn empty_value_packs_field_only() {
        let item = Item::pack(FieldId::new(7), ValueId::EMPTY);
        assert_eq!(item.field(), FieldId::new(7));
        assert_eq!(item.value_id(), ValueId::EMPTY);
        assert_eq!(item.as_u64(), 7);
    }

    #[test]
    fn raw_word_round_trip() {
        let item = Item::pack(FieldId::new(1), ValueId::new(1));
        assert_eq!(Item::from_u64(item.as_u64()), item);
    }

    #[test]
    fn extreme_ids() {
        let item = Item::pack(FieldId::new(u16::MAX as u32), ValueId::new(MAX_VALUE_ID));
        assert_eq!(item.field().as_u32(), u16::MAX as u32);
        assert_eq!(item.value_id().as_u64(), MAX_VALUE_ID);
    }

    #[test]
    fn any_word_decomposes() {
        let item = Item::from_u64(u64::MAX);
        assert_eq!(item.field().as_u32(), u16::MAX as u32);
        assert_eq!(item.value_id().as_u64(), MAX_VALUE_ID);
    }

    proptest! {
        #[test]
        fn pack_round_trips(field in 0u32..=u16::MAX as u32, value in 0u64..=MAX_VALUE_ID) {
            let item = Item::pack(FieldId::new(field), ValueId::new(value));
            prop_assert_eq!(item.field().as_u32(), field);
            prop_assert_eq!(item.value_id().as_u64(), value);
            prop_assert_eq!(Item::from_u64(item.as_u64()), item);
        }
    }
}
