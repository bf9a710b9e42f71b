//! E2E Suite 01: build/read round trips.
//!
//! Exercises the writer and reader together through the in-memory sink:
//! empty databases, single records, duplicate keys, empty values, large
//! collision-heavy key sets, and writer lifecycle misuse.

use std::io::Cursor;

use cdb::{CdbError, Pair32, Reader, Writer};

fn build(pairs: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut writer = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
    for (key, value) in pairs {
        writer.put(key, value).unwrap();
    }
    writer.finalize().unwrap().into_inner()
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: empty database
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_database() {
    let data = build(&[]);
    assert_eq!(data.len(), 2048, "an empty db is the index alone");

    let reader = Reader::<Pair32>::new(&data).unwrap();
    assert_eq!(reader.len(), 0);
    assert!(reader.is_empty());
    assert_eq!(reader.iter().next(), None);
    assert_eq!(reader.get(b"anything"), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: single record
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn single_record() {
    let data = build(&[(b"key", b"value")]);
    let reader = Reader::<Pair32>::new(&data).unwrap();

    assert_eq!(reader.len(), 1);
    assert_eq!(reader.get(b"key"), Some(&b"value"[..]));
    assert_eq!(reader.get(b"missing"), None);
    let items: Vec<_> = reader.iter().collect();
    assert_eq!(items, [(&b"key"[..], &b"value"[..])]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: duplicate keys
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn duplicate_keys_keep_every_record() {
    let data = build(&[(b"k", b"1"), (b"k", b"2"), (b"k", b"3")]);
    let reader = Reader::<Pair32>::new(&data).unwrap();

    assert_eq!(reader.len(), 3);
    // First insertion wins for the single-value lookup.
    assert_eq!(reader.get(b"k"), Some(&b"1"[..]));
    let all: Vec<_> = reader.get_all(b"k").collect();
    assert_eq!(all, [b"1", b"2", b"3"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: empty value
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_value_differs_from_absence() {
    let data = build(&[(b"k", b"")]);
    let reader = Reader::<Pair32>::new(&data).unwrap();

    assert_eq!(reader.get(b"k"), Some(&b""[..]));
    assert_eq!(reader.get(b"other"), None);
    assert!(matches!(reader.fetch(b"other"), Err(CdbError::KeyNotFound)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenario: 10,000 keys
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn ten_thousand_keys() {
    let mut writer = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
    for i in 0..10_000 {
        writer
            .put(format!("k{i}").as_bytes(), format!("{i}").as_bytes())
            .unwrap();
    }
    let data = writer.finalize().unwrap().into_inner();
    let reader = Reader::<Pair32>::new(&data).unwrap();

    assert_eq!(reader.len(), 10_000);
    assert_eq!(reader.get(b"k7777"), Some(&b"7777"[..]));
    assert_eq!(reader.get(b"k0"), Some(&b"0"[..]));
    assert_eq!(reader.get(b"k9999"), Some(&b"9999"[..]));
    assert_eq!(reader.get(b"k10001"), None);

    // Spot-check every key resolves to its own value.
    for i in (0..10_000).step_by(97) {
        let expect = format!("{i}");
        assert_eq!(
            reader.get(format!("k{i}").as_bytes()),
            Some(expect.as_bytes()),
            "k{i}"
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Iteration order
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn iteration_replays_insertions() {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..1000)
        .map(|i| {
            (
                format!("key-{i}").into_bytes(),
                format!("value-{i}").into_bytes(),
            )
        })
        .collect();
    let borrowed: Vec<(&[u8], &[u8])> = pairs.iter().map(|(k, v)| (&k[..], &v[..])).collect();
    let data = build(&borrowed);
    let reader = Reader::<Pair32>::new(&data).unwrap();

    let replay: Vec<_> = reader.iter().collect();
    assert_eq!(replay, borrowed);
}

#[test]
fn length_counts_every_put() {
    let mut writer = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
    writer.put(b"a", b"1").unwrap();
    writer.put(b"a", b"2").unwrap();
    writer.put(b"b", b"3").unwrap();
    writer.put_all(b"c", [b"4", b"5"]).unwrap();
    let data = writer.finalize().unwrap().into_inner();
    let reader = Reader::<Pair32>::new(&data).unwrap();
    assert_eq!(reader.len(), 5);
}

// ─────────────────────────────────────────────────────────────────────────────
// Writer lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn finalize_twice_is_protocol_misuse() {
    let mut writer = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
    writer.put(b"k", b"v").unwrap();
    writer.finalize().unwrap();
    assert!(matches!(writer.finalize(), Err(CdbError::Finalized)));
    assert!(matches!(writer.put(b"k", b"v"), Err(CdbError::Finalized)));
}

#[test]
fn abandoned_writer_leaves_an_empty_database() {
    // Never finalized: the index placeholder stays zeroed, so the record is
    // invisible to a reader even though its bytes were streamed out.
    let mut sink = Cursor::new(Vec::new());
    let mut writer = Writer::<_, Pair32>::new(&mut sink).unwrap();
    writer.put(b"k", b"v").unwrap();
    drop(writer);
    let data = sink.into_inner();

    let reader = Reader::<Pair32>::new(&data).unwrap();
    assert_eq!(reader.len(), 0);
    assert_eq!(reader.get(b"k"), None);
    assert_eq!(reader.iter().count(), 0);
}
