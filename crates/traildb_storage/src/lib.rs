//! # TrailDB Storage
//!
//! Storage backend trait and implementations for TrailDB.
//!
//! This crate provides the lowest-level byte-store abstraction under the
//! trail database engine. Backends do not interpret the data they hold -
//! the core crate owns the file format.
//!
//! ## Design Principles
//!
//! - Backends are simple byte stores (read, append, flush)
//! - Database files are written once at finalize and read-only afterwards,
//!   so there is no in-place update surface
//! - Must be `Send + Sync` so finalized databases can be read concurrently
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - persistent storage using OS file APIs
//! - [`InMemoryBackend`] - tests and ephemeral databases
//!
//! ## Example
//!
//! ```rust
//! use traildb_storage::{StorageBackend, InMemoryBackend};
//!
//! let mut backend = InMemoryBackend::new();
//! let offset = backend.append(b"hello trails").unwrap();
//! let data = backend.read_at(offset, 12).unwrap();
//! assert_eq!(&data, b"hello trails");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
