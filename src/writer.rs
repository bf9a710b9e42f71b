//! Write-side construction of a cdb.
//!
//! A [`Writer`] streams records to a seekable sink in a single forward pass,
//! holding only `(hash, offset)` bookkeeping in memory: one pair per record,
//! partitioned into 256 bucket lists by the low byte of the hash.  Memory
//! use is independent of key and value sizes.
//!
//! [`Writer::finalize`] performs the second pass: it lays out one
//! open-addressed slot table per bucket at a fixed 0.5 load factor, writes
//! the tables after the record region, then seeks back to offset 0 and
//! patches the 256-entry index over the zeroed placeholder written at
//! construction.  A writer dropped without finalizing therefore leaves a
//! valid, empty database behind: the zeroed index advertises no records.
//!
//! The writer is single-threaded and stateful.  Offsets are tracked
//! internally so the sink may buffer freely; the recorded positions always
//! match the final file positions.

use std::io::{Seek, SeekFrom, Write};
use std::marker::PhantomData;

use crate::error::CdbError;
use crate::hash::{djb_hash, HashFn};
use crate::layout::{Pair, Pair32, Pair64, NBUCKETS};

/// Writer for the 64-bit file variant.
pub type Writer64<S> = Writer<S, Pair64>;

/// Streaming builder for a constant database.
///
/// Create over a sink positioned at offset 0, call [`put`](Writer::put) any
/// number of times, then [`finalize`](Writer::finalize) exactly once to lay
/// out the hash tables and recover the sink.
pub struct Writer<S: Write + Seek, P: Pair = Pair32> {
    /// Taken by `finalize`; `None` marks a terminated writer.
    sink: Option<S>,
    hash: HashFn,
    /// Next write offset.  Tracked here so buffered sinks need no telling.
    pos: u64,
    /// `(hash, record_off)` per record, bucketed by the hash's low byte.
    buckets: Vec<Vec<(u32, u64)>>,
    _width: PhantomData<P>,
}

impl<S: Write + Seek, P: Pair> Writer<S, P> {
    /// Start a database on `sink` using the default hash.
    ///
    /// Writes the index placeholder immediately; the sink must be positioned
    /// at offset 0.
    pub fn new(sink: S) -> Result<Self, CdbError> {
        Self::with_hash(sink, djb_hash)
    }

    /// Start a database hashed with a non-default function.
    ///
    /// Readers of the resulting file must be given the same function.
    pub fn with_hash(mut sink: S, hash: HashFn) -> Result<Self, CdbError> {
        // Placeholder for the index; finalize seeks back and fills it in.
        sink.write_all(&vec![0u8; P::INDEX_SIZE])?;
        Ok(Writer {
            sink: Some(sink),
            hash,
            pos: P::INDEX_SIZE as u64,
            buckets: vec![Vec::new(); NBUCKETS],
            _width: PhantomData,
        })
    }

    /// Append one record.
    ///
    /// Duplicate keys are allowed; each call stores a distinct record, all
    /// reachable through [`Reader::get_all`](crate::Reader::get_all) in
    /// insertion order.  A sink failure poisons the build: the file is
    /// partially written and no further operation is defined.
    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), CdbError> {
        let hash = self.hash;
        let sink = self.sink.as_mut().ok_or(CdbError::Finalized)?;
        let pos = self.pos;
        let klen = key.len() as u64;
        let dlen = value.len() as u64;
        P::write(sink, klen, dlen)?;
        sink.write_all(key)?;
        sink.write_all(value)?;
        self.pos = pos + P::SIZE as u64 + klen + dlen;

        let h = hash(key);
        self.buckets[(h & 0xff) as usize].push((h, pos));
        Ok(())
    }

    /// Append one record per value, all under `key`, in order.
    pub fn put_all<I, V>(&mut self, key: &[u8], values: I) -> Result<(), CdbError>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
    {
        for value in values {
            self.put(key, value.as_ref())?;
        }
        Ok(())
    }

    /// Number of records written so far.
    pub fn record_count(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    /// Write the slot tables, patch the index, and hand back the sink.
    ///
    /// The sink is flushed but not closed; closing is the caller's business.
    /// A second call (or any later [`put`](Writer::put)) fails with
    /// [`CdbError::Finalized`].
    pub fn finalize(&mut self) -> Result<S, CdbError> {
        let mut sink = self.sink.take().ok_or(CdbError::Finalized)?;
        let mut index = [(0u64, 0u64); NBUCKETS];

        for (entry, bucket) in index.iter_mut().zip(&self.buckets) {
            let nslots = bucket.len() * 2;
            *entry = (self.pos, nslots as u64);
            if nslots == 0 {
                continue;
            }

            // Open addressing at load factor 0.5: place each record at its
            // home slot or the next free slot forward, wrapping at the end.
            // Half the table is empty, so the scan always terminates.
            let mut slots = vec![(0u32, 0u64); nslots];
            for &(h, rec_off) in bucket {
                let mut at = ((h >> 8) as usize) % nslots;
                while slots[at].0 != 0 {
                    at += 1;
                    if at == nslots {
                        at = 0;
                    }
                }
                slots[at] = (h, rec_off);
            }

            for &(h, rec_off) in &slots {
                P::write(&mut sink, u64::from(h), rec_off)?;
            }
            self.pos += (nslots * P::SIZE) as u64;
        }

        sink.seek(SeekFrom::Start(0))?;
        for &(off, nslots) in &index {
            P::write(&mut sink, off, nslots)?;
        }
        sink.flush()?;
        Ok(sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn empty_db_is_exactly_the_index() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        let data = w.finalize().unwrap().into_inner();
        assert_eq!(data.len(), 2048);
        // Every index entry is (2048, 0): all tables start at the end of the
        // (empty) record region.
        for i in 0..256 {
            assert_eq!(Pair32::read(&data, i * 8), Some((2048, 0)));
        }
    }

    #[test]
    fn placeholder_lands_before_first_record() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        w.put(b"key", b"value").unwrap();
        let data = w.finalize().unwrap().into_inner();
        // Record header directly after the index.
        assert_eq!(Pair32::read(&data, 2048), Some((3, 5)));
        assert_eq!(&data[2056..2059], b"key");
        assert_eq!(&data[2059..2064], b"value");
    }

    #[test]
    fn second_finalize_is_refused() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        w.put(b"k", b"v").unwrap();
        w.finalize().unwrap();
        assert!(matches!(w.finalize(), Err(CdbError::Finalized)));
    }

    #[test]
    fn put_after_finalize_is_refused() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        w.finalize().unwrap();
        assert!(matches!(w.put(b"k", b"v"), Err(CdbError::Finalized)));
    }

    #[test]
    fn put_all_appends_in_order() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        w.put_all(b"k", [b"1".as_slice(), b"2", b"3"]).unwrap();
        assert_eq!(w.record_count(), 3);
        let data = w.finalize().unwrap().into_inner();
        let r = crate::reader::Reader::<Pair32>::new(&data).unwrap();
        let vals: Vec<_> = r.get_all(b"k").collect();
        assert_eq!(vals, [b"1", b"2", b"3"]);
    }

    #[test]
    fn bucket_tables_hold_twice_the_records() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        let mut per_bucket = [0u64; 256];
        for i in 0..500 {
            let key = format!("key{i}");
            w.put(key.as_bytes(), b"x").unwrap();
            per_bucket[(djb_hash(key.as_bytes()) & 0xff) as usize] += 1;
        }
        let data = w.finalize().unwrap().into_inner();
        for (i, &count) in per_bucket.iter().enumerate() {
            let (_, nslots) = Pair32::read(&data, i * 8).unwrap();
            assert_eq!(nslots, count * 2, "bucket {i}");
        }
    }

    #[test]
    fn tables_are_contiguous_after_records() {
        let mut w = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
        let mut record_bytes = 0;
        for i in 0..50 {
            let key = format!("key{i}");
            let val = format!("value{i}");
            record_bytes += 8 + key.len() + val.len();
            w.put(key.as_bytes(), val.as_bytes()).unwrap();
        }
        let data = w.finalize().unwrap().into_inner();
        let min_off = (0..256)
            .map(|i| Pair32::read(&data, i * 8).unwrap().0)
            .min()
            .unwrap();
        assert_eq!(min_off, (2048 + record_bytes) as u64);
        // Tables fill the file to its end.
        let table_bytes: u64 = (0..256)
            .map(|i| Pair32::read(&data, i * 8).unwrap().1 * 8)
            .sum();
        assert_eq!(min_off + table_bytes, data.len() as u64);
    }

    #[test]
    fn wide_writer_wide_pairs() {
        let mut w = Writer64::new(Cursor::new(Vec::new())).unwrap();
        w.put(b"key", b"value").unwrap();
        let data = w.finalize().unwrap().into_inner();
        assert_eq!(Pair64::read(&data, 4096), Some((3, 5)));
        assert_eq!(&data[4112..4115], b"key");
    }
}
