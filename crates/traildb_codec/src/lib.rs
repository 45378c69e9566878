//! # TrailDB Codec
//!
//! Packed item encoding for TrailDB.
//!
//! An event stores one *item* per declared field: a `u64` packing the field
//! index together with the dense value identifier the field's lexicon
//! assigned to the raw value. This crate owns that bit transform and the
//! identifier newtypes it operates on; the lexicons themselves live in the
//! core crate.
//!
//! ## Usage
//!
//! ```
//! use traildb_codec::{FieldId, Item, ValueId};
//!
//! let item = Item::pack(FieldId::new(1), ValueId::new(42));
//! assert_eq!(item.field(), FieldId::new(1));
//! assert_eq!(item.value_id(), ValueId::new(42));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod item;
mod types;

pub use item::{Item, MAX_VALUE_ID};
pub use types::{FieldId, ValueId};
