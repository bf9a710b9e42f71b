//! File-backed convenience layer.
//!
//! The core [`Reader`](crate::Reader) and [`Writer`](crate::Writer) work on
//! byte sequences and sinks; this module binds them to the filesystem.  A
//! [`FileReader`] owns a memory map of the database file and lends out
//! `Reader` views borrowing it; [`FileWriter`] is a `Writer` over a buffered
//! file with a path-based constructor.

use std::fs::File;
use std::io::BufWriter;
use std::marker::PhantomData;
use std::path::Path;

use memmap2::Mmap;

use crate::error::CdbError;
use crate::hash::{djb_hash, HashFn};
use crate::layout::{Pair, Pair32, Pair64};
use crate::reader::Reader;
use crate::writer::Writer;

/// File-backed reader over the 64-bit variant.
pub type FileReader64 = FileReader<Pair64>;

/// Path-based writer for the classic format.
pub type FileWriter = Writer<BufWriter<File>, Pair32>;

/// Path-based writer for the 64-bit variant.
pub type FileWriter64 = Writer<BufWriter<File>, Pair64>;

/// An open, memory-mapped database file.
///
/// Owns the map; [`as_reader`](FileReader::as_reader) hands out cheap
/// borrowed views.  Lookups through those views cost page faults at worst,
/// never read syscalls.
pub struct FileReader<P: Pair = Pair32> {
    map: Mmap,
    hash: HashFn,
    _width: PhantomData<P>,
}

impl<P: Pair> FileReader<P> {
    /// Map the database at `path` using the default hash.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CdbError> {
        Self::open_with_hash(path, djb_hash)
    }

    /// Map a database built with a non-default hash function.
    pub fn open_with_hash(path: impl AsRef<Path>, hash: HashFn) -> Result<Self, CdbError> {
        let file = File::open(path)?;
        // SAFETY: the file is mapped read-only and cdb files are immutable
        // once finalized; no live writer mutates a finalized database.
        let map = unsafe { Mmap::map(&file)? };
        if map.len() < P::INDEX_SIZE {
            return Err(CdbError::TooSmall {
                len: map.len(),
                need: P::INDEX_SIZE,
            });
        }
        Ok(FileReader {
            map,
            hash,
            _width: PhantomData,
        })
    }

    /// A reader view borrowing the map.
    ///
    /// Parses the 256-entry index; hold the view across lookups rather than
    /// re-creating it per call.
    pub fn as_reader(&self) -> Reader<'_, P> {
        Reader::parse(&self.map, self.hash)
    }

    /// The mapped bytes of the whole file.
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }
}

impl<P: Pair> Writer<BufWriter<File>, P> {
    /// Create (or truncate) the file at `path` and start a database on it.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CdbError> {
        Self::create_with_hash(path, djb_hash)
    }

    /// Like [`create`](Writer::create) with a non-default hash function.
    pub fn create_with_hash(path: impl AsRef<Path>, hash: HashFn) -> Result<Self, CdbError> {
        let file = File::create(path)?;
        Self::with_hash(BufWriter::new(file), hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_map_and_look_up() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.cdb");

        let mut w = FileWriter::create(&path).unwrap();
        w.put(b"alpha", b"1").unwrap();
        w.put(b"beta", b"2").unwrap();
        w.finalize().unwrap();

        let db = FileReader::<Pair32>::open(&path).unwrap();
        let r = db.as_reader();
        assert_eq!(r.len(), 2);
        assert_eq!(r.get(b"alpha"), Some(&b"1"[..]));
        assert_eq!(r.get(b"beta"), Some(&b"2"[..]));
        assert_eq!(r.get(b"gamma"), None);
    }

    #[test]
    fn short_file_is_rejected_on_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("runt.cdb");
        std::fs::write(&path, [0u8; 100]).unwrap();
        assert!(matches!(
            FileReader::<Pair32>::open(&path),
            Err(CdbError::TooSmall { len: 100, .. })
        ));
    }

    #[test]
    fn wide_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.cdb");

        let mut w = FileWriter64::create(&path).unwrap();
        w.put(b"key", b"value").unwrap();
        w.finalize().unwrap();

        let db = FileReader64::open(&path).unwrap();
        assert_eq!(db.as_reader().get(b"key"), Some(&b"value"[..]));
        assert_eq!(std::fs::metadata(&path).unwrap().len() % 16, 0);
    }
}
