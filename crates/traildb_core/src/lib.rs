//! # TrailDB Core
//!
//! Core trail database engine.
//!
//! A trail database stores, per entity key, an immutable time-ordered
//! sequence of events and answers queries over it with dictionary-compressed
//! field values. This crate provides:
//!
//! - Per-field lexicons mapping raw values to dense identifiers
//! - The key index assigning dense trail ids in key sort order
//! - Two-phase construction: [`TrailConstructor`] staging into an immutable
//!   [`TrailDatabase`], including cross-database [`TrailConstructor::append`]
//! - Single-pass [`TrailCursor`] iteration over one trail's events
//! - The persisted single-file layout and the open-by-name rule
//!
//! ## Example
//!
//! ```rust,ignore
//! use traildb_core::{TrailConstructor, TrailDatabase, TrailId};
//!
//! let mut cons = TrailConstructor::new("clicks", ["action", "page"])?;
//! cons.add(b"user-1", 100, &["view", "/home"])?;
//! cons.add(b"user-1", 200, &["click", "/buy"])?;
//! let db = cons.finalize()?;
//!
//! for event in db.trail(TrailId::new(0))? {
//!     println!("{} {:?}", event.time, event.values());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod constructor;
mod cursor;
mod database;
mod error;
mod format;
mod key;
mod keys;
mod lexicon;
mod store;
pub mod time;
mod types;

pub use constructor::TrailConstructor;
pub use cursor::{CursorOptions, EventFields, TrailCursor, TrailEvent, Trails};
pub use database::{candidate_paths, TrailDatabase};
pub use error::{TrailError, TrailResult};
pub use format::{FORMAT_VERSION, MAGIC};
pub use key::TrailKey;
pub use keys::KeyIndex;
pub use lexicon::Lexicon;
pub use store::{EncodedEvent, TrailStore};
pub use types::{Timestamp, TrailId};

pub use traildb_codec::{FieldId, Item, ValueId};

/// Crate version, surfaced by the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
