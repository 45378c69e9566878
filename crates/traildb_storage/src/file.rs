//! File-based storage backend for persistent databases.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// Trail database files have a write-once lifecycle: [`FileBackend::create`]
/// produces a fresh file that the finalize step appends the encoded database
/// to, and [`FileBackend::open`] opens an existing file for reading. Opening
/// never creates a file, so a missing path surfaces as `NotFound` instead of
/// leaving an empty database behind.
///
/// # Thread Safety
///
/// Reads take `&self` but require a seek, so the file handle sits behind a
/// `parking_lot::RwLock`.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
}

impl FileBackend {
    /// Creates a new file at `path`, truncating any previous contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(0),
        })
    }

    /// Opens an existing file at `path` for reading.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the path does not exist, or an I/O error.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if !path.exists() {
            return Err(StorageError::NotFound {
                path: path.display().to_string(),
            });
        }

        let file = OpenOptions::new().read(true).open(path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if data.is_empty() {
            return Ok(*self.size.read());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;
        *size += data.len() as u64;

        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        self.file.write().flush()?;
        Ok(())
    }

    fn sync(&mut self) -> StorageResult<()> {
        self.file.write().sync_all()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
    }

    #[test]
    fn create_truncates_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        let mut backend = FileBackend::create(&path).unwrap();
        backend.append(b"stale contents").unwrap();
        backend.sync().unwrap();
        drop(backend);

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
    }

    #[test]
    fn open_missing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.tdb");

        let result = FileBackend::open(&path);
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        assert!(!path.exists());
    }

    #[test]
    fn append_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        let mut backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.append(b"header").unwrap(), 0);
        assert_eq!(backend.append(b"|events").unwrap(), 6);

        assert_eq!(backend.read_at(0, 13).unwrap(), b"header|events");
        assert_eq!(backend.read_at(7, 6).unwrap(), b"events");
    }

    #[test]
    fn read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        let mut backend = FileBackend::create(&path).unwrap();
        backend.append(b"short").unwrap();

        let result = backend.read_at(3, 10);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn reopen_reads_persisted_bytes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        {
            let mut backend = FileBackend::create(&path).unwrap();
            backend.append(b"durable").unwrap();
            backend.sync().unwrap();
        }

        let backend = FileBackend::open(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 7);
        assert_eq!(backend.read_all().unwrap(), b"durable");
    }

    #[test]
    fn empty_read_and_append() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        let mut backend = FileBackend::create(&path).unwrap();
        backend.append(b"x").unwrap();

        assert_eq!(backend.append(b"").unwrap(), 1);
        assert!(backend.read_at(1, 0).unwrap().is_empty());
    }

    #[test]
    fn path_accessor() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trails.tdb");

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.path(), path);
    }
}
