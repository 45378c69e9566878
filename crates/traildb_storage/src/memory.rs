//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;

/// An in-memory storage backend.
///
/// Holds all bytes in a single growable buffer. Suitable for unit tests and
/// for ephemeral databases that are finalized and queried without ever
/// touching the filesystem.
///
/// # Example
///
/// ```rust
/// use traildb_storage::{StorageBackend, InMemoryBackend};
///
/// let mut backend = InMemoryBackend::new();
/// let offset = backend.append(b"trail bytes").unwrap();
/// assert_eq!(offset, 0);
/// assert_eq!(backend.read_all().unwrap(), b"trail bytes");
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<Vec<u8>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory backend over pre-existing bytes.
    ///
    /// Used to re-open a database image that was produced by an earlier
    /// finalize into memory.
    #[must_use]
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Returns a copy of the full buffer.
    #[must_use]
    pub fn data(&self) -> Vec<u8> {
        self.data.read().clone()
    }
}

impl StorageBackend for InMemoryBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let data = self.data.read();
        let size = data.len() as u64;
        let start = offset as usize;
        let end = start.saturating_add(len);

        if offset > size || end > data.len() {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        Ok(data[start..end].to_vec())
    }

    fn append(&mut self, new_data: &[u8]) -> StorageResult<u64> {
        let mut data = self.data.write();
        let offset = data.len() as u64;
        data.extend_from_slice(new_data);
        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        // Nothing buffered
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        // No durable medium behind the buffer
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(self.data.read().len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_empty() {
        let backend = InMemoryBackend::new();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(backend.data().is_empty());
    }

    #[test]
    fn append_returns_offsets() {
        let mut backend = InMemoryBackend::new();

        assert_eq!(backend.append(b"abc").unwrap(), 0);
        assert_eq!(backend.append(b"defg").unwrap(), 3);
        assert_eq!(backend.size().unwrap(), 7);
    }

    #[test]
    fn read_at_slices_the_buffer() {
        let mut backend = InMemoryBackend::new();
        backend.append(b"timestamped events").unwrap();

        assert_eq!(backend.read_at(0, 11).unwrap(), b"timestamped");
        assert_eq!(backend.read_at(12, 6).unwrap(), b"events");
    }

    #[test]
    fn read_past_end_fails() {
        let mut backend = InMemoryBackend::new();
        backend.append(b"abc").unwrap();

        assert!(matches!(
            backend.read_at(2, 5),
            Err(StorageError::ReadPastEnd { .. })
        ));
        assert!(matches!(
            backend.read_at(10, 1),
            Err(StorageError::ReadPastEnd { .. })
        ));
    }

    #[test]
    fn with_data_round_trips() {
        let backend = InMemoryBackend::with_data(b"image".to_vec());
        assert_eq!(backend.size().unwrap(), 5);
        assert_eq!(backend.read_all().unwrap(), b"image");
    }

    #[test]
    fn zero_length_read() {
        let mut backend = InMemoryBackend::new();
        backend.append(b"abc").unwrap();
        assert!(backend.read_at(1, 0).unwrap().is_empty());
    }

    #[test]
    fn flush_and_sync_are_noops() {
        let mut backend = InMemoryBackend::new();
        backend.append(b"x").unwrap();
        assert!(backend.flush().is_ok());
        assert!(backend.sync().is_ok());
    }
}
