//! Feed arbitrary bytes to the reader: construction, lookup, and iteration
//! must never panic, whatever the input looks like.

#![no_main]

use libfuzzer_sys::fuzz_target;

use cdb::{Pair32, Reader, Reader64};

fuzz_target!(|data: &[u8]| {
    if let Ok(reader) = Reader::<Pair32>::new(data) {
        let _ = reader.len();
        let _ = reader.get(b"key");
        let _ = reader.get_all(b"key").count();
        for (key, value) in reader.iter().take(1024) {
            let _ = (key.len(), value.len());
        }
    }
    if let Ok(reader) = Reader64::new(data) {
        let _ = reader.get(b"key");
        let _ = reader.iter().take(1024).count();
    }
});
