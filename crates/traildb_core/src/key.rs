//! Trail keys.

use crate::error::{TrailError, TrailResult};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier of one trail.
///
/// Keys are fixed-width 16-byte values compared byte-exactly. The byte-wise
/// sort order is used only to assign dense trail identifiers at finalize;
/// it carries no other meaning.
///
/// Callers may supply shorter identifiers: [`TrailKey::from_slice`]
/// zero-pads them on the right to the canonical width. Identifiers longer
/// than 16 bytes are rejected rather than truncated. Lookups such as
/// `key_of` always return the canonical padded form.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrailKey([u8; 16]);

impl TrailKey {
    /// Canonical key width in bytes.
    pub const LEN: usize = 16;

    /// Creates a key from raw canonical-width bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Creates a key from a caller-supplied byte slice.
    ///
    /// Slices shorter than [`Self::LEN`] are zero-padded on the right.
    ///
    /// # Errors
    ///
    /// Returns `InvalidKeySize` if the slice is longer than [`Self::LEN`].
    pub fn from_slice(slice: &[u8]) -> TrailResult<Self> {
        if slice.len() > Self::LEN {
            return Err(TrailError::InvalidKeySize {
                max: Self::LEN,
                actual: slice.len(),
            });
        }
        let mut bytes = [0u8; Self::LEN];
        bytes[..slice.len()].copy_from_slice(slice);
        Ok(Self(bytes))
    }

    /// Creates a key from a UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid.into_bytes())
    }

    /// Creates a random key.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Returns the raw canonical bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Converts to a UUID.
    #[must_use]
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }
}

impl fmt::Debug for TrailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrailKey({self})")
    }
}

impl fmt::Display for TrailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 16]> for TrailKey {
    fn from(bytes: [u8; 16]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<TrailKey> for [u8; 16] {
    fn from(key: TrailKey) -> Self {
        key.0
    }
}

impl From<Uuid> for TrailKey {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

/// Renders arbitrary key bytes as hex for error messages.
pub(crate) fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        use fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}
