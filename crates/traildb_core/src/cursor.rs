//! Single-pass cursors over one trail's events.

use crate::database::TrailDatabase;
use crate::error::{TrailError, TrailResult};
use crate::store::EncodedEvent;
use crate::time;
use crate::types::{TrailId, Timestamp};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use traildb_codec::Item;

/// Decode options for a trail cursor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorOptions {
    /// Yield the raw packed items instead of lexicon-decoded values.
    pub raw_items: bool,
    /// Also convert each timestamp to UTC calendar time.
    pub parse_time: bool,
}

/// The per-field payload of one decoded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFields {
    /// Raw packed items, one per declared field (`raw_items` mode).
    Items(Vec<Item>),
    /// Lexicon-decoded values, one per declared field.
    Values(Vec<Bytes>),
}

/// One event yielded by a cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrailEvent {
    /// Raw integer event time; always present.
    pub time: Timestamp,
    /// UTC rendering of `time`, set in `parse_time` mode when the raw
    /// value is representable as calendar time.
    pub utc: Option<DateTime<Utc>>,
    /// Per-field payload in declared field order.
    pub fields: EventFields,
}

impl TrailEvent {
    /// The decoded values, unless the cursor runs in `raw_items` mode.
    #[must_use]
    pub fn values(&self) -> Option<&[Bytes]> {
        match &self.fields {
            EventFields::Values(values) => Some(values),
            EventFields::Items(_) => None,
        }
    }

    /// The raw items, when the cursor runs in `raw_items` mode.
    #[must_use]
    pub fn items(&self) -> Option<&[Item]> {
        match &self.fields {
            EventFields::Items(items) => Some(items),
            EventFields::Values(_) => None,
        }
    }

    /// One decoded value by zero-based declared-field position.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&Bytes> {
        self.values()?.get(index)
    }

    /// One raw item by zero-based declared-field position.
    #[must_use]
    pub fn item(&self, index: usize) -> Option<Item> {
        self.items()?.get(index).copied()
    }
}

/// Forward-only reader over one trail's time-ordered events.
///
/// A cursor starts positioned before the first event and lazily decodes one
/// stored event per advance. After the last event it is exhausted: every
/// further advance yields `None`. Cursors are not restartable - iterating
/// the same trail again means asking the database for a new cursor.
pub struct TrailCursor<'db> {
    db: &'db TrailDatabase,
    events: &'db [EncodedEvent],
    next: usize,
    opts: CursorOptions,
}

impl<'db> TrailCursor<'db> {
    pub(crate) fn new(
        db: &'db TrailDatabase,
        events: &'db [EncodedEvent],
        opts: CursorOptions,
    ) -> Self {
        Self {
            db,
            events,
            next: 0,
            opts,
        }
    }

    /// Always fails: a streaming cursor has no length.
    ///
    /// The number of events is intentionally not knowable without consuming
    /// the cursor, and no approximate count is offered instead.
    ///
    /// # Errors
    ///
    /// Always returns [`TrailError::CursorLength`].
    pub fn len(&self) -> TrailResult<usize> {
        Err(TrailError::CursorLength)
    }

    fn decode(&self, event: &EncodedEvent) -> TrailEvent {
        let fields = if self.opts.raw_items {
            EventFields::Items(event.items.clone())
        } else {
            EventFields::Values(
                event
                    .items
                    .iter()
                    .map(|item| self.db.decode_item(*item).unwrap_or_default())
                    .collect(),
            )
        };
        let utc = if self.opts.parse_time {
            time::to_utc(event.time)
        } else {
            None
        };
        TrailEvent {
            time: event.time,
            utc,
            fields,
        }
    }
}

impl Iterator for TrailCursor<'_> {
    type Item = TrailEvent;

    fn next(&mut self) -> Option<TrailEvent> {
        let event = self.events.get(self.next)?;
        self.next += 1;
        Some(self.decode(event))
    }
}

/// Iterator over every trail of a database in trail-id order.
///
/// Yields each trail's key together with a fresh cursor over its events.
pub struct Trails<'db> {
    db: &'db TrailDatabase,
    next: u32,
    opts: CursorOptions,
}

impl<'db> Trails<'db> {
    pub(crate) fn new(db: &'db TrailDatabase, opts: CursorOptions) -> Self {
        Self { db, next: 0, opts }
    }
}

impl<'db> Iterator for Trails<'db> {
    type Item = (&'db crate::key::TrailKey, TrailCursor<'db>);

    fn next(&mut self) -> Option<Self::Item> {
        let id = TrailId::new(self.next);
        let key = self.db.key_of(id).ok()?;
        let cursor = self.db.trail_with(id, self.opts).ok()?;
        self.next += 1;
        Some((key, cursor))
    }
}
