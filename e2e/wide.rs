//! E2E Suite 03: the 64-bit file variant.
//!
//! The wide format doubles every integer to 8 bytes (16-byte pairs, a
//! 4096-byte index) and is otherwise identical.  The two widths must behave
//! identically through the API and must not be interchangeable on disk.

use std::io::Cursor;

use cdb::{Pair, Pair32, Pair64, Reader, Reader64, Writer};

fn build<P: Pair>(pairs: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut writer = Writer::<_, P>::new(Cursor::new(Vec::new())).unwrap();
    for (key, value) in pairs {
        writer.put(key, value).unwrap();
    }
    writer.finalize().unwrap().into_inner()
}

// ─────────────────────────────────────────────────────────────────────────────
// Geometry
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn wide_pairs_are_sixteen_bytes() {
    assert_eq!(Pair32::SIZE, 8);
    assert_eq!(Pair64::SIZE, 16);
    assert_eq!(Pair64::INDEX_SIZE, 4096);
}

#[test]
fn wide_empty_db_is_a_4096_byte_index() {
    let data = build::<Pair64>(&[]);
    assert_eq!(data.len(), 4096);

    let reader = Reader64::new(&data).unwrap();
    assert_eq!(reader.len(), 0);
    assert_eq!(reader.iter().next(), None);
}

#[test]
fn wide_record_region_starts_after_the_index() {
    let data = build::<Pair64>(&[(b"key", b"value")]);
    // Record header at 4096: klen=3, dlen=5, 8 bytes each, little-endian.
    assert_eq!(u64::from_le_bytes(data[4096..4104].try_into().unwrap()), 3);
    assert_eq!(u64::from_le_bytes(data[4104..4112].try_into().unwrap()), 5);
    assert_eq!(&data[4112..4115], b"key");
    assert_eq!(&data[4115..4120], b"value");
}

// ─────────────────────────────────────────────────────────────────────────────
// Behavioral parity
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn both_widths_agree_on_the_same_input() {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..1000)
        .map(|i| (format!("key{i}").into_bytes(), format!("{i}").into_bytes()))
        .collect();
    let borrowed: Vec<(&[u8], &[u8])> = pairs.iter().map(|(k, v)| (&k[..], &v[..])).collect();

    let narrow = build::<Pair32>(&borrowed);
    let wide = build::<Pair64>(&borrowed);

    let narrow_reader = Reader::<Pair32>::new(&narrow).unwrap();
    let wide_reader = Reader64::new(&wide).unwrap();

    assert_eq!(narrow_reader.len(), wide_reader.len());
    let narrow_items: Vec<_> = narrow_reader.iter().collect();
    let wide_items: Vec<_> = wide_reader.iter().collect();
    assert_eq!(narrow_items, wide_items);

    for (key, value) in &borrowed {
        assert_eq!(narrow_reader.get(key), Some(*value));
        assert_eq!(wide_reader.get(key), Some(*value));
    }
    assert_eq!(narrow_reader.get(b"nope"), None);
    assert_eq!(wide_reader.get(b"nope"), None);
}

#[test]
fn wide_duplicates_and_empty_values() {
    let data = build::<Pair64>(&[(b"k", b"1"), (b"k", b""), (b"k", b"3")]);
    let reader = Reader64::new(&data).unwrap();
    let all: Vec<_> = reader.get_all(b"k").collect();
    assert_eq!(all, [&b"1"[..], &b""[..], &b"3"[..]]);
}

// ─────────────────────────────────────────────────────────────────────────────
// The widths are distinct formats
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn narrow_reader_misreads_a_wide_file() {
    let data = build::<Pair64>(&[(b"key", b"value")]);

    // The 4096-byte wide index parses as a 2048-byte narrow index followed
    // by garbage.  Each wide integer splits into (low, high) halves, and for
    // any file under 4 GiB every high half is zero, so every narrow index
    // entry reports zero slots: the record is undiscoverable.
    let reader = Reader::<Pair32>::new(&data).unwrap();
    assert_eq!(reader.len(), 0);
    assert_eq!(reader.get(b"key"), None);
}

#[test]
fn wide_reader_rejects_a_narrow_empty_file() {
    let data = build::<Pair32>(&[]);
    // 2048 bytes cannot hold the wide index.
    assert!(Reader64::new(&data).is_err());
}
