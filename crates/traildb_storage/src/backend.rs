//! Storage backend trait definition.

use crate::error::StorageResult;

/// A low-level byte store for trail database files.
///
/// Backends are **opaque byte stores**: the database layer owns all file
/// format interpretation, and a backend only reads, appends, and flushes
/// bytes. Trail database files are written once (during finalize) and are
/// read-only afterwards, so the trait has no in-place update or truncation
/// surface.
///
/// # Invariants
///
/// - `append` returns the offset where the data landed
/// - `read_at` returns exactly the bytes previously written at that offset
/// - `flush` pushes buffered writes down; `sync` makes them durable
/// - Backends must be `Send + Sync` so a finalized database can be read
///   concurrently
///
/// # Implementors
///
/// - [`super::FileBackend`] - persistent storage
/// - [`super::InMemoryBackend`] - tests and ephemeral databases
pub trait StorageBackend: Send + Sync {
    /// Reads `len` bytes starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns `ReadPastEnd` if the range extends beyond the current size,
    /// or an I/O error.
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>>;

    /// Appends data at the end of the storage and returns the offset it was
    /// written at.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn append(&mut self, data: &[u8]) -> StorageResult<u64>;

    /// Flushes buffered writes to the underlying store.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    fn flush(&mut self) -> StorageResult<()>;

    /// Syncs data and metadata to durable storage.
    ///
    /// Stronger than `flush`: after this returns, appended data survives
    /// process termination.
    ///
    /// # Errors
    ///
    /// Returns an error if the sync fails.
    fn sync(&mut self) -> StorageResult<()>;

    /// Returns the current size of the storage in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined.
    fn size(&self) -> StorageResult<u64>;

    /// Reads the entire contents of the storage.
    ///
    /// Database files are parsed whole at open time, so this is the main
    /// read entry point.
    ///
    /// # Errors
    ///
    /// Returns an error if the size cannot be determined or the read fails.
    fn read_all(&self) -> StorageResult<Vec<u8>> {
        let size = self.size()?;
        self.read_at(0, size as usize)
    }
}
