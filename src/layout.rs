//! Pair encoding and file geometry.
//!
//! Everything in a cdb file is built from a single primitive: a pair of
//! unsigned little-endian integers of width `W` bytes.  The classic format
//! uses `W = 4`; the 64-bit variant uses `W = 8` and is otherwise identical.
//! [`Pair`] captures the width, [`Pair32`] and [`Pair64`] are the two
//! instantiations, and readers and writers are generic over them.
//!
//! # File layout
//!
//! ```text
//! offset 0:            index[0..256) of pair(table_off, nslots)
//! offset 256·SIZE:     records, concatenated in insertion order
//!                      each record: pair(klen, dlen), key bytes, value bytes
//! offset table_start:  slot tables for buckets 0..255,
//!                      each slot a pair(hash, record_off)
//! ```
//!
//! `table_start` is the minimum `table_off` over all 256 index entries.  An
//! all-zero slot pair is the empty slot and terminates a probe.

use std::io::Write;

use crate::error::CdbError;

/// Number of hash buckets.  The low byte of a key's hash selects one.
pub const NBUCKETS: usize = 256;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Pair32 {}
    impl Sealed for super::Pair64 {}
}

/// Integer-pair codec for one file width.
///
/// Sealed: the format defines exactly two widths, [`Pair32`] and [`Pair64`].
pub trait Pair: sealed::Sealed + Copy + Send + Sync + 'static {
    /// Encoded size of one pair (`2·W` bytes).
    const SIZE: usize;

    /// Largest integer encodable at this width.
    const MAX: u64;

    /// Bytes occupied by the 256-entry index at offset 0.
    const INDEX_SIZE: usize = NBUCKETS * Self::SIZE;

    /// Decode the pair at byte offset `pos`, or `None` if it would overrun
    /// `data`.
    fn read(data: &[u8], pos: usize) -> Option<(u64, u64)>;

    /// Encode `(a, b)` onto `sink`.
    ///
    /// Fails with [`CdbError::Oversize`] when either integer exceeds
    /// [`Self::MAX`].
    fn write<S: Write>(sink: &mut S, a: u64, b: u64) -> Result<(), CdbError>;
}

/// Classic 32-bit width: 4-byte integers, 8-byte pairs, 2048-byte index.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pair32;

/// 64-bit width: 8-byte integers, 16-byte pairs, 4096-byte index.
///
/// Only offsets and lengths widen; hashes remain 32-bit and are stored
/// zero-extended.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pair64;

impl Pair for Pair32 {
    const SIZE: usize = 8;
    const MAX: u64 = u32::MAX as u64;

    #[inline]
    fn read(data: &[u8], pos: usize) -> Option<(u64, u64)> {
        let bytes = data.get(pos..pos.checked_add(Self::SIZE)?)?;
        let a = u32::from_le_bytes(bytes[..4].try_into().ok()?);
        let b = u32::from_le_bytes(bytes[4..].try_into().ok()?);
        Some((u64::from(a), u64::from(b)))
    }

    fn write<S: Write>(sink: &mut S, a: u64, b: u64) -> Result<(), CdbError> {
        if a > Self::MAX || b > Self::MAX {
            return Err(CdbError::Oversize(a.max(b)));
        }
        let mut buf = [0u8; 8];
        buf[..4].copy_from_slice(&(a as u32).to_le_bytes());
        buf[4..].copy_from_slice(&(b as u32).to_le_bytes());
        sink.write_all(&buf)?;
        Ok(())
    }
}

impl Pair for Pair64 {
    const SIZE: usize = 16;
    const MAX: u64 = u64::MAX;

    #[inline]
    fn read(data: &[u8], pos: usize) -> Option<(u64, u64)> {
        let bytes = data.get(pos..pos.checked_add(Self::SIZE)?)?;
        let a = u64::from_le_bytes(bytes[..8].try_into().ok()?);
        let b = u64::from_le_bytes(bytes[8..].try_into().ok()?);
        Some((a, b))
    }

    fn write<S: Write>(sink: &mut S, a: u64, b: u64) -> Result<(), CdbError> {
        let mut buf = [0u8; 16];
        buf[..8].copy_from_slice(&a.to_le_bytes());
        buf[8..].copy_from_slice(&b.to_le_bytes());
        sink.write_all(&buf)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair32_byte_layout() {
        let mut buf = Vec::new();
        Pair32::write(&mut buf, 0xDEAD_BEEF, 0x0102_0304).unwrap();
        // Little-endian, first integer first.
        assert_eq!(buf, [0xEF, 0xBE, 0xAD, 0xDE, 0x04, 0x03, 0x02, 0x01]);
        assert_eq!(Pair32::read(&buf, 0), Some((0xDEAD_BEEF, 0x0102_0304)));
    }

    #[test]
    fn pair64_byte_layout() {
        let mut buf = Vec::new();
        Pair64::write(&mut buf, 0x0102_0304_0506_0708, 1).unwrap();
        assert_eq!(
            buf,
            [0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 1, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(Pair64::read(&buf, 0), Some((0x0102_0304_0506_0708, 1)));
    }

    #[test]
    fn read_at_offset() {
        let mut buf = vec![0u8; 4];
        Pair32::write(&mut buf, 7, 9).unwrap();
        assert_eq!(Pair32::read(&buf, 4), Some((7, 9)));
        // Misaligned read straddles the leading zeros and the first integer.
        assert_eq!(Pair32::read(&buf, 0), Some((0, 7)));
    }

    #[test]
    fn short_buffer_reads_none() {
        let buf = [0u8; 7];
        assert_eq!(Pair32::read(&buf, 0), None);
        assert_eq!(Pair32::read(&buf, usize::MAX), None);
        let buf = [0u8; 15];
        assert_eq!(Pair64::read(&buf, 0), None);
    }

    #[test]
    fn pair32_rejects_oversize() {
        let mut buf = Vec::new();
        let err = Pair32::write(&mut buf, u64::from(u32::MAX) + 1, 0).unwrap_err();
        assert!(matches!(err, CdbError::Oversize(_)));
        assert!(buf.is_empty());
    }

    #[test]
    fn index_sizes() {
        assert_eq!(Pair32::INDEX_SIZE, 2048);
        assert_eq!(Pair64::INDEX_SIZE, 4096);
    }
}
