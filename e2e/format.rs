//! E2E Suite 02: on-disk format conformance.
//!
//! Decodes finalized databases with raw byte arithmetic, independently of
//! the library's reader, and checks the normative layout: index geometry,
//! record region, slot-table placement, load factor, and the bucket-byte
//! rule.  A database failing these checks would be unreadable by other cdb
//! implementations.

use std::io::Cursor;

use cdb::{djb_hash, Pair32, Writer};

/// Raw little-endian pair decode, deliberately not using the library.
fn pair(data: &[u8], at: usize) -> (u64, u64) {
    let a = u32::from_le_bytes(data[at..at + 4].try_into().unwrap());
    let b = u32::from_le_bytes(data[at + 4..at + 8].try_into().unwrap());
    (u64::from(a), u64::from(b))
}

fn build(pairs: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut writer = Writer::<_, Pair32>::new(Cursor::new(Vec::new())).unwrap();
    for (key, value) in pairs {
        writer.put(key, value).unwrap();
    }
    writer.finalize().unwrap().into_inner()
}

// ─────────────────────────────────────────────────────────────────────────────
// Index geometry
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_db_index_points_at_its_own_end() {
    let data = build(&[]);
    assert_eq!(data.len(), 2048);
    for bucket in 0..256 {
        assert_eq!(pair(&data, bucket * 8), (2048, 0), "bucket {bucket}");
    }
}

#[test]
fn table_start_is_the_minimum_index_offset() {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..300)
        .map(|i| (format!("key{i}").into_bytes(), format!("{i}").into_bytes()))
        .collect();
    let borrowed: Vec<(&[u8], &[u8])> = pairs.iter().map(|(k, v)| (&k[..], &v[..])).collect();
    let data = build(&borrowed);

    let record_bytes: usize = pairs.iter().map(|(k, v)| 8 + k.len() + v.len()).sum();
    let min_off = (0..256).map(|i| pair(&data, i * 8).0).min().unwrap();
    assert_eq!(min_off as usize, 2048 + record_bytes);

    // Tables are contiguous from there to the end of the file.
    let table_bytes: u64 = (0..256).map(|i| pair(&data, i * 8).1 * 8).sum();
    assert_eq!(min_off + table_bytes, data.len() as u64);
}

// ─────────────────────────────────────────────────────────────────────────────
// Record region
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn records_are_laid_out_in_insertion_order() {
    let data = build(&[(b"first", b"1"), (b"second", b"22"), (b"third", b"333")]);

    let mut at = 2048usize;
    for (key, value) in [
        (&b"first"[..], &b"1"[..]),
        (&b"second"[..], &b"22"[..]),
        (&b"third"[..], &b"333"[..]),
    ] {
        let (klen, dlen) = pair(&data, at);
        assert_eq!((klen, dlen), (key.len() as u64, value.len() as u64));
        at += 8;
        assert_eq!(&data[at..at + key.len()], key);
        at += key.len();
        assert_eq!(&data[at..at + value.len()], value);
        at += value.len();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Slot tables
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn slot_tables_obey_load_factor_and_bucket_byte() {
    let keys: Vec<Vec<u8>> = (0..2000).map(|i| format!("entry/{i}").into_bytes()).collect();
    let pairs: Vec<(&[u8], &[u8])> = keys.iter().map(|k| (&k[..], &b"x"[..])).collect();
    let data = build(&pairs);

    let mut per_bucket = [0u64; 256];
    for key in &keys {
        per_bucket[(djb_hash(key) & 0xff) as usize] += 1;
    }

    let mut total_records = 0u64;
    for bucket in 0..256usize {
        let (off, nslots) = pair(&data, bucket * 8);
        assert_eq!(
            nslots,
            per_bucket[bucket] * 2,
            "bucket {bucket}: two slots per record"
        );
        total_records += nslots / 2;

        let mut empty = 0u64;
        for slot in 0..nslots {
            let (slot_hash, rec_off) = pair(&data, (off + slot * 8) as usize);
            if slot_hash == 0 && rec_off == 0 {
                empty += 1;
                continue;
            }
            // Low byte of the hash is the bucket number.
            assert_eq!(slot_hash & 0xff, bucket as u64, "bucket {bucket} slot {slot}");
            // The slot points at a record whose key produces this hash.
            let (klen, _) = pair(&data, rec_off as usize);
            let key_at = rec_off as usize + 8;
            let stored = &data[key_at..key_at + klen as usize];
            assert_eq!(u64::from(djb_hash(stored)), slot_hash);
        }
        assert_eq!(empty, nslots / 2, "bucket {bucket}: half the slots empty");
    }
    assert_eq!(total_records, 2000);
}

#[test]
fn every_record_is_reachable_from_its_home_slot() {
    let keys: Vec<Vec<u8>> = (0..500).map(|i| format!("probe{i}").into_bytes()).collect();
    let pairs: Vec<(&[u8], &[u8])> = keys.iter().map(|k| (&k[..], &b"y"[..])).collect();
    let data = build(&pairs);

    for key in &keys {
        let h = u64::from(djb_hash(key));
        let (start, nslots) = pair(&data, ((h & 0xff) * 8) as usize);
        assert_ne!(nslots, 0);

        // Walk the ring from the home slot; the record must appear before
        // any empty slot does.
        let home = (h >> 8) % nslots;
        let mut found = false;
        for step in 0..nslots {
            let slot = (home + step) % nslots;
            let (slot_hash, rec_off) = pair(&data, (start + slot * 8) as usize);
            assert!(
                !(slot_hash == 0 && rec_off == 0),
                "empty slot before record for {}",
                String::from_utf8_lossy(key)
            );
            if slot_hash == h {
                let (klen, _) = pair(&data, rec_off as usize);
                if &data[rec_off as usize + 8..rec_off as usize + 8 + klen as usize] == &key[..] {
                    found = true;
                    break;
                }
            }
        }
        assert!(found, "unreachable record for {}", String::from_utf8_lossy(key));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Byte-identical output
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn construction_is_deterministic() {
    let pairs: Vec<(Vec<u8>, Vec<u8>)> = (0..100)
        .map(|i| (format!("k{i}").into_bytes(), format!("v{i}").into_bytes()))
        .collect();
    let borrowed: Vec<(&[u8], &[u8])> = pairs.iter().map(|(k, v)| (&k[..], &v[..])).collect();
    assert_eq!(build(&borrowed), build(&borrowed));
}
