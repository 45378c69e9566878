//! Boundary conversion between raw timestamps and calendar time.
//!
//! The engine stores and orders events by an opaque `u64`; interpreting it
//! as seconds since the Unix epoch happens only here, as a pure transform
//! applied after decoding. Nothing inside the lexicon, codec, or store
//! layers touches calendar time.

use crate::types::Timestamp;
use chrono::{DateTime, TimeZone, Utc};

/// Converts a raw timestamp to UTC calendar time.
///
/// Returns `None` when the value does not fit chrono's representable range.
#[must_use]
pub fn to_utc(ts: Timestamp) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(ts).ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

/// Converts UTC calendar time back to a raw timestamp.
///
/// Returns `None` for instants before the Unix epoch.
#[must_use]
pub fn from_utc(dt: DateTime<Utc>) -> Option<Timestamp> {
    u64::try_from(dt.timestamp()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let ts = 1_451_610_060; // 2016-01-01 01:01:00 UTC
        let dt = to_utc(ts).unwrap();
        assert_eq!(dt.timestamp(), ts as i64);
        assert_eq!(from_utc(dt), Some(ts));
    }

    #[test]
    fn epoch() {
        let dt = to_utc(0).unwrap();
        assert_eq!(dt.timestamp(), 0);
    }

    #[test]
    fn out_of_range_is_none() {
        assert_eq!(to_utc(u64::MAX), None);
    }
}
