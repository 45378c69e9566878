//! Error types for trail database operations.

use std::io;
use thiserror::Error;
use traildb_codec::FieldId;

/// Result type for trail database operations.
pub type TrailResult<T> = Result<T, TrailError>;

/// Errors that can occur in trail database operations.
///
/// No error is retried internally and there is no partial-result recovery:
/// a failure during finalize or append consumes the constructor, and a
/// failure during open leaves no open database behind.
#[derive(Debug, Error)]
pub enum TrailError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] traildb_storage::StorageError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Neither candidate path resolved to a readable, well-formed database.
    ///
    /// Open failures are unified: a missing file and a file that fails
    /// header or checksum validation both surface as this kind.
    #[error("cannot open trail database {name:?}: {reason}")]
    DatabaseOpen {
        /// The base name the open was attempted with.
        name: String,
        /// What went wrong with the last candidate tried.
        reason: String,
    },

    /// A key lookup missed: the key names no trail in this database.
    #[error("unknown key: {key}")]
    UnknownKey {
        /// Hex rendering of the looked-up key bytes.
        key: String,
    },

    /// A structurally invalid index: field index or trail id outside the
    /// valid bounds of this database.
    #[error("{what} out of range: {index} (valid range 0..{bound})")]
    OutOfRange {
        /// What kind of index was out of range.
        what: &'static str,
        /// The offending index.
        index: u64,
        /// Exclusive upper bound of the valid range.
        bound: u64,
    },

    /// A reverse lexicon lookup missed: the value was never interned for
    /// this field.
    #[error("unknown value for {field}")]
    UnknownValue {
        /// The field whose lexicon was searched.
        field: FieldId,
    },

    /// A field name does not exist in this database.
    #[error("unknown field: {name}")]
    UnknownField {
        /// The name that failed to resolve.
        name: String,
    },

    /// A declared field name is unusable.
    #[error("invalid field name: {name:?}")]
    InvalidFieldName {
        /// The rejected name (empty, duplicate, or the reserved `time`).
        name: String,
    },

    /// A caller-supplied key is longer than the canonical key width.
    #[error("invalid key size: at most {max} bytes, got {actual}")]
    InvalidKeySize {
        /// Maximum key width in bytes.
        max: usize,
        /// Length of the rejected key.
        actual: usize,
    },

    /// The database file failed format validation.
    #[error("invalid database format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The length of a live cursor was requested.
    ///
    /// Trail cursors are single-pass: their length is not knowable without
    /// consuming them, and no approximate count is returned instead.
    #[error("trail cursors are single-pass and have no length until exhausted")]
    CursorLength,
}

impl TrailError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an out-of-range error.
    #[must_use]
    pub fn out_of_range(what: &'static str, index: u64, bound: u64) -> Self {
        Self::OutOfRange { what, index, bound }
    }

    /// Creates a database open error.
    pub fn database_open(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DatabaseOpen {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
