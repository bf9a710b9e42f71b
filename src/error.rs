//! Library error type.
//!
//! One enum covers both halves of the crate: reader construction and lookup
//! failures on one side, sink and lifecycle failures of the writer on the
//! other.  Lookups that report absence through their return value (`get`
//! returning `None`, `get_all` yielding nothing) are the normal success path
//! and never produce an error.

use std::fmt;
use std::io;

/// Errors surfaced by cdb readers and writers.
#[derive(Debug)]
pub enum CdbError {
    /// The byte sequence is too short to hold the 256-entry index.
    TooSmall {
        /// Actual length of the supplied sequence.
        len: usize,
        /// Minimum length for this file width (256 index pairs).
        need: usize,
    },
    /// A strict lookup ([`Reader::fetch`](crate::Reader::fetch)) found no
    /// record under the key.
    KeyNotFound,
    /// The sink reported a write or seek failure.  The build is dead; the
    /// file may be partially written.
    Io(io::Error),
    /// The writer was used after `finalize` released its sink.
    Finalized,
    /// A length or offset does not fit the file's integer width (a 32-bit
    /// file cannot address past 4 GiB).
    Oversize(u64),
}

impl fmt::Display for CdbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdbError::TooSmall { len, need } => {
                write!(f, "cdb too small: {len} bytes, index alone needs {need}")
            }
            CdbError::KeyNotFound => write!(f, "key not found"),
            CdbError::Io(err) => write!(f, "sink failure: {err}"),
            CdbError::Finalized => write!(f, "writer already finalized"),
            CdbError::Oversize(n) => {
                write!(f, "value {n} does not fit the file's integer width")
            }
        }
    }
}

impl std::error::Error for CdbError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CdbError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for CdbError {
    fn from(err: io::Error) -> Self {
        CdbError::Io(err)
    }
}
