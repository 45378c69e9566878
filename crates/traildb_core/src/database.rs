//! The finalized, immutable trail database.

use crate::cursor::{CursorOptions, TrailCursor, Trails};
use crate::error::{TrailError, TrailResult};
use crate::format;
use crate::key::{self, TrailKey};
use crate::keys::KeyIndex;
use crate::lexicon::Lexicon;
use crate::store::TrailStore;
use crate::time;
use crate::types::{TrailId, Timestamp};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use traildb_codec::{FieldId, Item, ValueId};
use traildb_storage::{FileBackend, StorageBackend};

/// A finalized trail database.
///
/// Produced by [`crate::TrailConstructor::finalize`] or by [`Self::open`].
/// Immutable after creation: every read operation is a pure function of
/// this state, so a database can be shared freely across threads and read
/// by any number of concurrent cursors without coordination.
///
/// # Opening a Database
///
/// `open` takes a base name and tries the literal path first, then the
/// path with `.tdb` appended. Both a missing file and a file that fails
/// validation surface as the single [`TrailError::DatabaseOpen`] kind:
///
/// ```rust,ignore
/// use traildb_core::TrailDatabase;
///
/// let db = TrailDatabase::open("clickstream")?; // finds clickstream.tdb
/// for (key, trail) in db.trails() {
///     for event in trail {
///         // ...
///     }
/// }
/// ```
#[derive(Debug)]
pub struct TrailDatabase {
    /// Declared field names, not counting the implicit time field.
    pub(crate) fields: Vec<String>,
    /// One lexicon per declared field.
    pub(crate) lexicons: Vec<Lexicon>,
    /// Key to trail-id bijection.
    pub(crate) keys: KeyIndex,
    /// Per-trail encoded events.
    pub(crate) store: TrailStore,
    /// Total event count.
    pub(crate) num_events: u64,
    /// Smallest and largest event timestamp; `None` without events.
    pub(crate) time_range: Option<(Timestamp, Timestamp)>,
}

/// The ordered list of paths the open-by-name rule tries.
///
/// Pure: no probing, no process-wide state - callers try the candidates in
/// order.
#[must_use]
pub fn candidate_paths(base: &Path) -> Vec<PathBuf> {
    let mut with_ext = base.as_os_str().to_os_string();
    with_ext.push(".tdb");
    vec![base.to_path_buf(), PathBuf::from(with_ext)]
}

impl TrailDatabase {
    /// Opens a database by base name.
    ///
    /// Tries the literal path, then the path with `.tdb` appended.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::DatabaseOpen`] when neither candidate resolves
    /// to an existing, well-formed database file.
    pub fn open(base: impl AsRef<Path>) -> TrailResult<Self> {
        let base = base.as_ref();
        let name = base.display().to_string();

        let mut reason = String::from("no candidate path exists");
        for candidate in candidate_paths(base) {
            if !candidate.exists() {
                continue;
            }
            let backend = match FileBackend::open(&candidate) {
                Ok(backend) => backend,
                Err(err) => {
                    reason = err.to_string();
                    continue;
                }
            };
            return match Self::from_backend(&backend) {
                Ok(db) => {
                    tracing::debug!(
                        path = %candidate.display(),
                        num_trails = db.num_trails(),
                        num_events = db.num_events(),
                        "opened trail database"
                    );
                    Ok(db)
                }
                Err(err) => Err(TrailError::database_open(name, err.to_string())),
            };
        }

        Err(TrailError::database_open(name, reason))
    }

    /// Reads a database from a storage backend.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be read, or
    /// [`TrailError::InvalidFormat`] if validation fails.
    pub fn from_backend(backend: &dyn StorageBackend) -> TrailResult<Self> {
        let bytes = backend.read_all()?;
        Self::from_bytes(&bytes)
    }

    /// Reads a database from a raw byte image.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::InvalidFormat`] if validation fails.
    pub fn from_bytes(bytes: &[u8]) -> TrailResult<Self> {
        format::read(bytes)
    }

    /// Writes the database image to a storage backend.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the write fails.
    pub fn write_to(&self, backend: &mut dyn StorageBackend) -> TrailResult<()> {
        format::write(self, backend)
    }

    /// Number of trails.
    #[must_use]
    pub fn num_trails(&self) -> usize {
        self.keys.len()
    }

    /// Total number of events across all trails.
    #[must_use]
    pub fn num_events(&self) -> u64 {
        self.num_events
    }

    /// Number of declared fields, not counting the implicit time field.
    #[must_use]
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Declared field names in field order.
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Smallest event timestamp, `None` without events.
    #[must_use]
    pub fn min_timestamp(&self) -> Option<Timestamp> {
        self.time_range.map(|(min, _)| min)
    }

    /// Largest event timestamp, `None` without events.
    #[must_use]
    pub fn max_timestamp(&self) -> Option<Timestamp> {
        self.time_range.map(|(_, max)| max)
    }

    /// Smallest and largest event timestamp, `None` without events.
    #[must_use]
    pub fn time_range(&self) -> Option<(Timestamp, Timestamp)> {
        self.time_range
    }

    /// The time range converted to UTC calendar time.
    ///
    /// `None` without events or when a bound falls outside the
    /// representable calendar range.
    #[must_use]
    pub fn time_range_utc(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let (min, max) = self.time_range?;
        Some((time::to_utc(min)?, time::to_utc(max)?))
    }

    /// Resolves a field name to its field index.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::UnknownField`] for a name that was not
    /// declared.
    pub fn field_id(&self, name: &str) -> TrailResult<FieldId> {
        self.fields
            .iter()
            .position(|f| f == name)
            .map(|i| FieldId::new(i as u32 + 1))
            .ok_or_else(|| TrailError::UnknownField {
                name: name.to_string(),
            })
    }

    /// The name of a declared field.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for field 0 (time) or an index beyond the
    /// declared fields.
    pub fn field_name(&self, field: FieldId) -> TrailResult<&str> {
        let index = self.field_offset(field)?;
        Ok(&self.fields[index])
    }

    /// Size of a field's lexicon, counting the reserved empty value.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` outside `1..=num_fields`.
    pub fn lexicon_size(&self, field: FieldId) -> TrailResult<u64> {
        Ok(self.lexicon_for(field)?.len())
    }

    /// Enumerates a field's lexicon: ids `1..size` ascending with values.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` outside `1..=num_fields`.
    pub fn lexicon(&self, field: FieldId) -> TrailResult<impl Iterator<Item = (ValueId, &Bytes)>> {
        Ok(self.lexicon_for(field)?.iter())
    }

    /// Looks up the trail id assigned to a key.
    ///
    /// The key is normalized to canonical width first; a key that cannot
    /// name any trail (including one longer than the canonical width) is
    /// reported as unknown.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::UnknownKey`] when the key names no trail.
    pub fn trail_id(&self, key: &[u8]) -> TrailResult<TrailId> {
        TrailKey::from_slice(key)
            .ok()
            .and_then(|k| self.keys.trail_id_of(&k))
            .ok_or_else(|| TrailError::UnknownKey { key: key::hex(key) })
    }

    /// Looks up the canonical key assigned to a trail id.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for an id at or beyond `num_trails`.
    pub fn key_of(&self, id: TrailId) -> TrailResult<&TrailKey> {
        self.keys
            .key_of(id)
            .ok_or_else(|| self.trail_out_of_range(id))
    }

    /// True when the key names a trail in this database. Never fails;
    /// malformed keys are simply absent.
    #[must_use]
    pub fn contains(&self, key: &[u8]) -> bool {
        TrailKey::from_slice(key)
            .map(|k| self.keys.contains(&k))
            .unwrap_or(false)
    }

    /// A cursor over one trail's events with decoded values and raw
    /// integer timestamps.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for an id at or beyond `num_trails`.
    pub fn trail(&self, id: TrailId) -> TrailResult<TrailCursor<'_>> {
        self.trail_with(id, CursorOptions::default())
    }

    /// A cursor over one trail's events with explicit decode options.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` for an id at or beyond `num_trails`.
    pub fn trail_with(&self, id: TrailId, opts: CursorOptions) -> TrailResult<TrailCursor<'_>> {
        let events = self
            .store
            .events_of(id)
            .ok_or_else(|| self.trail_out_of_range(id))?;
        Ok(TrailCursor::new(self, events, opts))
    }

    /// Iterates every trail in trail-id order as `(key, cursor)` pairs.
    #[must_use]
    pub fn trails(&self) -> Trails<'_> {
        Trails::new(self, CursorOptions::default())
    }

    /// Iterates every trail with explicit decode options.
    #[must_use]
    pub fn trails_with(&self, opts: CursorOptions) -> Trails<'_> {
        Trails::new(self, opts)
    }

    /// Resolves a field name and raw value to the packed item that
    /// represents them in this database.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::UnknownField`] for an undeclared name and
    /// [`TrailError::UnknownValue`] for a value the field never saw.
    pub fn get_item(&self, field_name: &str, value: &[u8]) -> TrailResult<Item> {
        let field = self.field_id(field_name)?;
        let id = self
            .lexicon_for(field)?
            .id_of(value)
            .ok_or(TrailError::UnknownValue { field })?;
        Ok(Item::pack(field, id))
    }

    /// Looks up the identifier a field's lexicon assigned to a value.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` outside `1..=num_fields` and
    /// [`TrailError::UnknownValue`] for a value the field never saw.
    pub fn value_id(&self, field: FieldId, value: &[u8]) -> TrailResult<ValueId> {
        self.lexicon_for(field)?
            .id_of(value)
            .ok_or(TrailError::UnknownValue { field })
    }

    /// Recovers the raw value a packed item stands for.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the item's field index or value id falls
    /// outside this database.
    pub fn get_item_value(&self, item: Item) -> TrailResult<Bytes> {
        self.get_value(item.field(), item.value_id())
    }

    /// Recovers the raw value behind a (field, value-id) pair.
    ///
    /// # Errors
    ///
    /// Returns `OutOfRange` if the field index or value id falls outside
    /// this database.
    pub fn get_value(&self, field: FieldId, id: ValueId) -> TrailResult<Bytes> {
        let lexicon = self.lexicon_for(field)?;
        lexicon.value(id).cloned().ok_or_else(|| {
            TrailError::out_of_range("value id", id.as_u64(), lexicon.len())
        })
    }

    /// Decodes an item against this database's lexicons, `None` when the
    /// item does not belong to it.
    pub(crate) fn decode_item(&self, item: Item) -> Option<Bytes> {
        let offset = item.field().as_u32().checked_sub(1)? as usize;
        self.lexicons.get(offset)?.value(item.value_id()).cloned()
    }

    /// Zero-based offset of a declared field, rejecting the time field and
    /// anything beyond the declared range.
    fn field_offset(&self, field: FieldId) -> TrailResult<usize> {
        let raw = field.as_u32() as u64;
        if field.is_time() || raw > self.fields.len() as u64 {
            return Err(TrailError::out_of_range(
                "field index",
                raw,
                self.fields.len() as u64 + 1,
            ));
        }
        Ok(field.as_u32() as usize - 1)
    }

    fn lexicon_for(&self, field: FieldId) -> TrailResult<&Lexicon> {
        let offset = self.field_offset(field)?;
        Ok(&self.lexicons[offset])
    }

    fn trail_out_of_range(&self, id: TrailId) -> TrailError {
        TrailError::out_of_range("trail id", u64::from(id.as_u32()), self.keys.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_try_literal_then_extension() {
        let candidates = candidate_paths(Path::new("clicks"));
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], Path::new("clicks"));
        assert_eq!(candidates[1], Path::new("clicks.tdb"));
    }

    #[test]
    fn candidates_keep_directories() {
        let candidates = candidate_paths(Path::new("data/2016/clicks"));
        assert_eq!(candidates[0], Path::new("data/2016/clicks"));
        assert_eq!(candidates[1], Path::new("data/2016/clicks.tdb"));
    }

    #[test]
    fn open_missing_name_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = TrailDatabase::open(dir.path().join("nothing-here"));
        assert!(matches!(result, Err(TrailError::DatabaseOpen { .. })));
    }

    #[test]
    fn open_garbage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.tdb");
        std::fs::write(&path, b"not a trail database").unwrap();

        let result = TrailDatabase::open(dir.path().join("garbage"));
        assert!(matches!(result, Err(TrailError::DatabaseOpen { .. })));
    }
}
