//! Constant Database (cdb) files: immutable on-disk maps from byte keys to
//! byte values, in D. J. Bernstein's format.
//!
//! A cdb is built once, in a streaming pass, and then read forever: point
//! lookup touches at most two regions of the file, keys may repeat, and
//! iteration replays records in insertion order.  Files produced here are
//! byte-compatible with every other cdb implementation.
//!
//! Two widths are supported.  The classic format ([`Pair32`]) stores 32-bit
//! little-endian offsets and caps a file at 4 GiB; the 64-bit variant
//! ([`Pair64`]) widens offsets and lengths to 64 bits.  The two are distinct,
//! non-interchangeable formats sharing all logic.
//!
//! ```no_run
//! use std::io::Cursor;
//! use cdb::{Reader, Writer};
//!
//! # fn main() -> Result<(), cdb::CdbError> {
//! let mut writer: Writer<_> = Writer::new(Cursor::new(Vec::new()))?;
//! writer.put(b"one", b"1")?;
//! writer.put(b"one", b"uno")?;
//! let data = writer.finalize()?.into_inner();
//!
//! let reader: Reader = Reader::new(&data)?;
//! assert_eq!(reader.get(b"one"), Some(&b"1"[..]));
//! assert_eq!(reader.get_all(b"one").count(), 2);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod error;
pub mod file;
pub mod hash;
pub mod layout;
pub mod reader;
pub mod writer;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level re-exports for the common entry points.
// ─────────────────────────────────────────────────────────────────────────────

/// Library error type.
pub use error::CdbError;

/// The canonical cdb hash and its pluggable function type.
pub use hash::{djb_hash, HashFn};

/// File widths and the codec trait they implement.
pub use layout::{Pair, Pair32, Pair64, NBUCKETS};

/// Read-side API over any in-memory byte sequence.
pub use reader::{Reader, Reader64};

/// Write-side API over any seekable sink.
pub use writer::{Writer, Writer64};

/// Filesystem conveniences: memory-mapped readers, path-based writers.
pub use file::{FileReader, FileReader64, FileWriter, FileWriter64};
