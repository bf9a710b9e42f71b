//! The cdbmake textual record format.
//!
//! One record per line:
//!
//! ```text
//! +klen,dlen:key->value
//! ```
//!
//! where `klen` and `dlen` are the decimal byte lengths of the key and value.
//! The key and value are raw bytes, read by length, so they may contain any
//! byte including newlines and the separator itself.  The stream ends with a
//! single blank line.
//!
//! `+3,5:one->11111` followed by `\n\n` is a complete one-record stream.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};

/// Streaming parser over cdbmake-format input.
///
/// Yields `(key, value)` pairs until the blank terminator line; every
/// deviation from the grammar is an error carrying the record number.
pub struct RecordReader<R: BufRead> {
    input: R,
    /// 1-based index of the record being parsed, for error messages.
    record: u64,
    done: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(input: R) -> Self {
        RecordReader {
            input,
            record: 0,
            done: false,
        }
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut byte = [0u8; 1];
        self.input
            .read_exact(&mut byte)
            .with_context(|| format!("record {}: unexpected end of input", self.record))?;
        Ok(byte[0])
    }

    /// Read a decimal length terminated by `delim`.
    fn read_len(&mut self, delim: u8) -> Result<u64> {
        let mut value: u64 = 0;
        let mut digits = 0usize;
        loop {
            let byte = self.read_byte()?;
            if byte == delim {
                if digits == 0 {
                    bail!("record {}: empty length field", self.record);
                }
                return Ok(value);
            }
            if !byte.is_ascii_digit() {
                bail!(
                    "record {}: expected digit or {:?}, found {:?}",
                    self.record,
                    char::from(delim),
                    char::from(byte)
                );
            }
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u64::from(byte - b'0')))
                .with_context(|| format!("record {}: length overflows", self.record))?;
            digits += 1;
        }
    }

    fn read_exactly(&mut self, len: u64) -> Result<Vec<u8>> {
        let len = usize::try_from(len)
            .with_context(|| format!("record {}: length too large", self.record))?;
        let mut buf = vec![0u8; len];
        self.input
            .read_exact(&mut buf)
            .with_context(|| format!("record {}: truncated", self.record))?;
        Ok(buf)
    }

    fn expect(&mut self, expected: &[u8]) -> Result<()> {
        for &want in expected {
            let got = self.read_byte()?;
            if got != want {
                bail!(
                    "record {}: expected {:?}, found {:?}",
                    self.record,
                    char::from(want),
                    char::from(got)
                );
            }
        }
        Ok(())
    }

    fn parse_one(&mut self) -> Result<Option<(Vec<u8>, Vec<u8>)>> {
        self.record += 1;
        match self.read_byte()? {
            b'\n' => return Ok(None),
            b'+' => {}
            other => bail!(
                "record {}: expected '+' or terminating newline, found {:?}",
                self.record,
                char::from(other)
            ),
        }
        let klen = self.read_len(b',')?;
        let dlen = self.read_len(b':')?;
        let key = self.read_exactly(klen)?;
        self.expect(b"->")?;
        let value = self.read_exactly(dlen)?;
        self.expect(b"\n")?;
        Ok(Some((key, value)))
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<(Vec<u8>, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.parse_one() {
            Ok(Some(pair)) => Some(Ok(pair)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Emit one record in cdbmake format.
pub fn write_record<W: Write>(out: &mut W, key: &[u8], value: &[u8]) -> std::io::Result<()> {
    write!(out, "+{},{}:", key.len(), value.len())?;
    out.write_all(key)?;
    out.write_all(b"->")?;
    out.write_all(value)?;
    out.write_all(b"\n")
}

/// Emit the blank line ending a record stream.
pub fn write_terminator<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.write_all(b"\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        RecordReader::new(input).collect()
    }

    #[test]
    fn parses_simple_stream() {
        let records = parse(b"+3,5:one->11111\n+3,2:two->22\n\n").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], (b"one".to_vec(), b"11111".to_vec()));
        assert_eq!(records[1], (b"two".to_vec(), b"22".to_vec()));
    }

    #[test]
    fn empty_stream_is_one_newline() {
        assert_eq!(parse(b"\n").unwrap(), []);
    }

    #[test]
    fn zero_length_key_and_value() {
        let records = parse(b"+0,0:->\n\n").unwrap();
        assert_eq!(records, [(vec![], vec![])]);
    }

    #[test]
    fn binary_payloads_pass_through() {
        // Key contains the separator and a newline; lengths disambiguate.
        let records = parse(b"+4,3:a\n->->\x00\x01\x02\n\n").unwrap();
        assert_eq!(records, [(b"a\n->".to_vec(), b"\x00\x01\x02".to_vec())]);
    }

    #[test]
    fn missing_terminator_is_an_error() {
        assert!(parse(b"+1,1:a->b\n").is_err());
        assert!(parse(b"").is_err());
    }

    #[test]
    fn malformed_records_are_errors() {
        assert!(parse(b"+,1:->x\n\n").is_err());
        assert!(parse(b"+1x,1:a->b\n\n").is_err());
        assert!(parse(b"+1,1:a=>b\n\n").is_err());
        assert!(parse(b"garbage\n").is_err());
        assert!(parse(b"+5,1:ab").is_err());
    }

    #[test]
    fn round_trips_through_writer() {
        let mut out = Vec::new();
        write_record(&mut out, b"key", b"value").unwrap();
        write_record(&mut out, b"", b"").unwrap();
        write_terminator(&mut out).unwrap();
        assert_eq!(out, b"+3,5:key->value\n+0,0:->\n\n");
        let back = parse(&out).unwrap();
        assert_eq!(
            back,
            [(b"key".to_vec(), b"value".to_vec()), (vec![], vec![])]
        );
    }
}
