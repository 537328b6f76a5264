//! Store operation error taxonomy
//!
//! Every record store reports failures through a read/write split so callers
//! can tell "could not load state" apart from "could not commit a change".

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised when scanning or fetching durable records
#[derive(Debug, Error)]
pub enum StorageReadError {
    /// The underlying query failed
    #[error("storage read failed: {0}")]
    Query(#[from] sqlx::Error),

    /// A stored column held a value the record type cannot represent
    #[error("corrupt {column} column: {message}")]
    Decode {
        /// Column that failed to decode
        column: &'static str,
        /// Decoder diagnostic
        message: String,
    },
}

/// Errors raised when inserting or deleting durable records
#[derive(Debug, Error)]
pub enum StorageWriteError {
    /// The underlying statement failed
    #[error("storage write failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Parse an RFC 3339 timestamp column into a UTC timestamp.
pub(crate) fn decode_timestamp(
    column: &'static str,
    raw: &str,
) -> Result<DateTime<Utc>, StorageReadError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageReadError::Decode { column, message: format!("{raw:?}: {e}") })
}
