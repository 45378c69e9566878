//! Two-phase construction: mutable staging into an immutable database.

use crate::database::TrailDatabase;
use crate::error::{TrailError, TrailResult};
use crate::key::TrailKey;
use crate::keys::KeyIndex;
use crate::lexicon::Lexicon;
use crate::store::{EncodedEvent, TrailStore};
use crate::types::Timestamp;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use traildb_codec::{FieldId, Item};
use traildb_storage::FileBackend;

/// One staged event: raw values as given, padded lazily at finalize.
#[derive(Debug)]
struct StagedEvent {
    time: Timestamp,
    values: Vec<Bytes>,
}

/// Mutable staging half of a trail database.
///
/// A constructor accumulates raw `(key, timestamp, values)` triples in
/// arbitrary order, optionally absorbs already-finalized databases via
/// [`Self::append`], and is consumed exactly once by [`Self::finalize`],
/// which sorts, dictionary-encodes, and freezes everything into a
/// [`TrailDatabase`]. Because finalize takes the constructor by value,
/// staging a finalized constructor is a compile error rather than a runtime
/// state check, and a finalized database can never flow back into the
/// constructor that produced it.
///
/// Constructors are single-writer by design: one caller owns the
/// constructor for its whole staging lifetime.
///
/// # Example
///
/// ```rust,ignore
/// use traildb_core::TrailConstructor;
///
/// let mut cons = TrailConstructor::new("clicks", ["action", "page"])?;
/// cons.add(b"user-1", 1462, &["view", "/home"])?;
/// cons.add(b"user-1", 1461, &["click", "/home"])?; // order is free
/// let db = cons.finalize()?; // writes clicks.tdb
/// ```
#[derive(Debug)]
pub struct TrailConstructor {
    /// Output base path; finalize writes `<path>.tdb`.
    path: PathBuf,
    /// Declared field names, fixed at creation.
    fields: Vec<String>,
    /// Pending events per key. Sorted key order doubles as the trail-id
    /// assignment at finalize.
    staged: BTreeMap<TrailKey, Vec<StagedEvent>>,
}

impl TrailConstructor {
    /// Creates a constructor with a database name and field list.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::InvalidFieldName`] for an empty name, a
    /// duplicate, or the reserved `time`.
    pub fn new(
        path: impl Into<PathBuf>,
        fields: impl IntoIterator<Item = impl Into<String>>,
    ) -> TrailResult<Self> {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        for (i, name) in fields.iter().enumerate() {
            if name.is_empty() || name == "time" || fields[..i].contains(name) {
                return Err(TrailError::InvalidFieldName { name: name.clone() });
            }
        }
        Ok(Self {
            path: path.into(),
            fields,
            staged: BTreeMap::new(),
        })
    }

    /// The declared field names, not counting the implicit time field.
    #[must_use]
    pub fn field_names(&self) -> &[String] {
        &self.fields
    }

    /// Stages one event under a key.
    ///
    /// Values map to declared fields in order; missing trailing values are
    /// treated as the empty value. Events may arrive in any timestamp
    /// order and keys may repeat freely across calls - nothing is sorted
    /// or deduplicated until finalize.
    ///
    /// # Errors
    ///
    /// Returns [`TrailError::InvalidKeySize`] for a key longer than the
    /// canonical width, and `OutOfRange` for more values than declared
    /// fields.
    pub fn add<V: AsRef<[u8]>>(
        &mut self,
        key: &[u8],
        timestamp: Timestamp,
        values: &[V],
    ) -> TrailResult<()> {
        let key = TrailKey::from_slice(key)?;
        if values.len() > self.fields.len() {
            return Err(TrailError::out_of_range(
                "value count",
                values.len() as u64,
                self.fields.len() as u64 + 1,
            ));
        }
        self.staged.entry(key).or_default().push(StagedEvent {
            time: timestamp,
            values: values
                .iter()
                .map(|v| Bytes::copy_from_slice(v.as_ref()))
                .collect(),
        });
        Ok(())
    }

    /// Merges a finalized database's events into the staging set.
    ///
    /// Every event of every trail in `other` is decoded back to raw values
    /// and staged under `other`'s key for that trail, so keys shared
    /// between the staged events and `other` end up as one merged,
    /// re-sorted trail after finalize. Fields are matched by name: a field
    /// of `other` not declared here is dropped, and a declared field
    /// absent from `other` is filled with the empty value.
    pub fn append(&mut self, other: &TrailDatabase) -> TrailResult<()> {
        // Position of each of our fields inside other's item vectors
        let mapping: Vec<Option<usize>> = self
            .fields
            .iter()
            .map(|name| {
                other
                    .field_names()
                    .iter()
                    .position(|theirs| theirs == name)
            })
            .collect();

        let mut appended = 0u64;
        for (key, cursor) in other.trails() {
            let bucket = self.staged.entry(*key).or_default();
            for event in cursor {
                let decoded = event.values().unwrap_or_default();
                let values = mapping
                    .iter()
                    .map(|slot| {
                        slot.and_then(|i| decoded.get(i).cloned())
                            .unwrap_or_else(Bytes::new)
                    })
                    .collect();
                bucket.push(StagedEvent {
                    time: event.time,
                    values,
                });
                appended += 1;
            }
        }

        tracing::debug!(
            trails = other.num_trails(),
            events = appended,
            "appended finalized database into staging"
        );
        Ok(())
    }

    /// Finalizes the staged events into an immutable database.
    ///
    /// Runs the deterministic pipeline: assign trail ids in ascending key
    /// order, stable-sort each trail's events by timestamp (ties keep
    /// insertion order), intern every value in (trail, time, insertion)
    /// scan order so lexicon ids follow first appearance, encode events to
    /// packed items, freeze the metadata, and write the database image to
    /// `<path>.tdb`.
    ///
    /// Consumes the constructor; the staging buffers are gone afterwards
    /// whether or not finalize succeeds.
    ///
    /// # Errors
    ///
    /// Returns a storage or I/O error if the database file cannot be
    /// written.
    pub fn finalize(self) -> TrailResult<TrailDatabase> {
        let Self {
            path,
            fields,
            staged,
        } = self;

        let keys = KeyIndex::from_sorted(staged.keys().copied().collect());
        let mut lexicons: Vec<Lexicon> = (0..fields.len()).map(|_| Lexicon::new()).collect();

        let mut trails = Vec::with_capacity(staged.len());
        let mut num_events = 0u64;
        let mut time_range: Option<(Timestamp, Timestamp)> = None;

        for (_, mut events) in staged {
            // Stable sort: equal timestamps keep their insertion order
            events.sort_by_key(|e| e.time);

            let mut encoded = Vec::with_capacity(events.len());
            for event in events {
                let mut items = Vec::with_capacity(fields.len());
                for (offset, lexicon) in lexicons.iter_mut().enumerate() {
                    let value = event.values.get(offset).cloned().unwrap_or_else(Bytes::new);
                    let id = lexicon.intern(value);
                    items.push(Item::pack(FieldId::new(offset as u32 + 1), id));
                }
                time_range = Some(match time_range {
                    None => (event.time, event.time),
                    Some((lo, hi)) => (lo.min(event.time), hi.max(event.time)),
                });
                num_events += 1;
                encoded.push(EncodedEvent {
                    time: event.time,
                    items,
                });
            }
            trails.push(encoded);
        }

        let db = TrailDatabase {
            fields,
            lexicons,
            keys,
            store: TrailStore::new(trails),
            num_events,
            time_range,
        };

        let out = output_path(&path);
        let mut backend = FileBackend::create(&out)?;
        db.write_to(&mut backend)?;

        tracing::info!(
            path = %out.display(),
            num_trails = db.num_trails(),
            num_events = db.num_events(),
            "finalized trail database"
        );
        Ok(db)
    }
}

/// The file a constructor finalizes to: the base path with `.tdb` appended
/// unless it already carries the extension.
fn output_path(base: &Path) -> PathBuf {
    if base.extension().is_some_and(|ext| ext == "tdb") {
        return base.to_path_buf();
    }
    let mut with_ext = base.as_os_str().to_os_string();
    with_ext.push(".tdb");
    PathBuf::from(with_ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TrailId;
    use tempfile::tempdir;

    #[test]
    fn rejects_bad_field_names() {
        let dup = TrailConstructor::new("db", ["a", "a"]);
        assert!(matches!(dup, Err(TrailError::InvalidFieldName { .. })));

        let reserved = TrailConstructor::new("db", ["time"]);
        assert!(matches!(
            reserved,
            Err(TrailError::InvalidFieldName { .. })
        ));

        let empty = TrailConstructor::new("db", [""]);
        assert!(matches!(empty, Err(TrailError::InvalidFieldName { .. })));
    }

    #[test]
    fn rejects_over_long_key() {
        let mut cons = TrailConstructor::new("db", ["f"]).unwrap();
        let result = cons.add(&[0u8; 17], 1, &["x"]);
        assert!(matches!(result, Err(TrailError::InvalidKeySize { .. })));
    }

    #[test]
    fn rejects_too_many_values() {
        let mut cons = TrailConstructor::new("db", ["f"]).unwrap();
        let result = cons.add(b"k", 1, &["one", "extra"]);
        assert!(matches!(result, Err(TrailError::OutOfRange { .. })));
    }

    #[test]
    fn equal_timestamps_keep_insertion_order() {
        let dir = tempdir().unwrap();
        let mut cons =
            TrailConstructor::new(dir.path().join("ties"), ["f"]).unwrap();
        cons.add(b"k", 7, &["first"]).unwrap();
        cons.add(b"k", 7, &["second"]).unwrap();
        cons.add(b"k", 3, &["earliest"]).unwrap();

        let db = cons.finalize().unwrap();
        let values: Vec<_> = db
            .trail(TrailId::new(0))
            .unwrap()
            .map(|e| e.values().unwrap()[0].clone())
            .collect();
        assert_eq!(values, ["earliest", "first", "second"]);
    }

    #[test]
    fn trail_ids_follow_key_sort_order() {
        let dir = tempdir().unwrap();
        let mut cons =
            TrailConstructor::new(dir.path().join("sorted"), ["f"]).unwrap();
        cons.add(b"zzz", 1, &["z"]).unwrap();
        cons.add(b"aaa", 1, &["a"]).unwrap();
        cons.add(b"mmm", 1, &["m"]).unwrap();

        let db = cons.finalize().unwrap();
        let keys: Vec<_> = (0..3)
            .map(|i| *db.key_of(TrailId::new(i)).unwrap())
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn output_path_appends_extension_once() {
        assert_eq!(output_path(Path::new("clicks")), Path::new("clicks.tdb"));
        assert_eq!(
            output_path(Path::new("clicks.tdb")),
            Path::new("clicks.tdb")
        );
        assert_eq!(
            output_path(Path::new("dir/clicks")),
            Path::new("dir/clicks.tdb")
        );
    }

    #[test]
    fn finalize_with_no_events() {
        let dir = tempdir().unwrap();
        let cons = TrailConstructor::new(dir.path().join("empty"), ["f"]).unwrap();
        let db = cons.finalize().unwrap();

        assert_eq!(db.num_trails(), 0);
        assert_eq!(db.num_events(), 0);
        assert_eq!(db.time_range(), None);
        assert!(dir.path().join("empty.tdb").exists());
    }
}
