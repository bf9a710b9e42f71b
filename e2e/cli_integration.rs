//! E2E Suite 04: the `cdb` binary as a black box.
//!
//! Drives make/dump/get through std::process::Command: record streams in,
//! databases and exit codes out.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use tempfile::TempDir;

/// Locate the `cdb` binary produced by Cargo.
fn cdb_bin() -> PathBuf {
    // CARGO_BIN_EXE_cdb is set by Cargo when running integration tests.
    // Fall back to walking up from the test binary location.
    if let Ok(p) = std::env::var("CARGO_BIN_EXE_cdb") {
        return PathBuf::from(p);
    }
    let mut p = std::env::current_exe().unwrap();
    p.pop();
    if p.ends_with("deps") {
        p.pop();
    }
    p.push("cdb");
    p
}

const RECORDS: &str = "+3,5:one->11111\n+3,2:two->22\n+3,5:one->again\n\n";

fn make_db(dir: &TempDir, records: &str) -> PathBuf {
    let input = dir.path().join("records.txt");
    let db = dir.path().join("data.cdb");
    fs::write(&input, records).unwrap();

    let status = Command::new(cdb_bin())
        .args(["make", db.to_str().unwrap(), input.to_str().unwrap()])
        .status()
        .expect("failed to run cdb make");
    assert!(status.success(), "make should exit 0");
    db
}

// ─────────────────────────────────────────────────────────────────────────────
// make
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn make_builds_a_database() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir, RECORDS);

    assert!(db.exists());
    // Index plus three records plus six slots.
    let len = fs::metadata(&db).unwrap().len();
    assert!(len > 2048, "db should hold records, got {len} bytes");
    // The temporary build file was renamed away.
    assert!(!dir.path().join("data.cdb.tmp").exists());
}

#[test]
fn make_rejects_malformed_input_and_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("bad.txt");
    let db = dir.path().join("data.cdb");
    fs::write(&input, "+3,5:one->11111\nnot a record\n").unwrap();

    let output = Command::new(cdb_bin())
        .args(["make", db.to_str().unwrap(), input.to_str().unwrap()])
        .output()
        .expect("failed to run cdb make");
    assert!(!output.status.success(), "malformed input must fail");
    assert!(!db.exists(), "no database published on failure");
    assert!(!dir.path().join("data.cdb.tmp").exists(), "tmp cleaned up");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("record"), "diagnostic names the record: {stderr}");
}

// ─────────────────────────────────────────────────────────────────────────────
// dump
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn dump_round_trips_the_record_stream() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir, RECORDS);

    let output = Command::new(cdb_bin())
        .args(["dump", db.to_str().unwrap()])
        .output()
        .expect("failed to run cdb dump");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), RECORDS);
}

#[test]
fn dump_of_rebuilt_dump_is_identical() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir, RECORDS);

    let dumped = Command::new(cdb_bin())
        .args(["dump", db.to_str().unwrap()])
        .output()
        .unwrap()
        .stdout;

    let db2 = {
        let input = dir.path().join("records2.txt");
        fs::write(&input, &dumped).unwrap();
        let db2 = dir.path().join("data2.cdb");
        let status = Command::new(cdb_bin())
            .args(["make", db2.to_str().unwrap(), input.to_str().unwrap()])
            .status()
            .unwrap();
        assert!(status.success());
        db2
    };

    assert_eq!(fs::read(&db).unwrap(), fs::read(&db2).unwrap());
}

// ─────────────────────────────────────────────────────────────────────────────
// get
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn get_prints_the_first_value() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir, RECORDS);

    let output = Command::new(cdb_bin())
        .args(["get", db.to_str().unwrap(), "one"])
        .output()
        .expect("failed to run cdb get");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"11111\n");
}

#[test]
fn get_all_prints_every_value_in_order() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir, RECORDS);

    let output = Command::new(cdb_bin())
        .args(["get", "-a", db.to_str().unwrap(), "one"])
        .output()
        .expect("failed to run cdb get -a");
    assert!(output.status.success());
    assert_eq!(output.stdout, b"11111\nagain\n");
}

#[test]
fn get_missing_key_exits_100() {
    let dir = TempDir::new().unwrap();
    let db = make_db(&dir, RECORDS);

    let output = Command::new(cdb_bin())
        .args(["get", db.to_str().unwrap(), "absent"])
        .output()
        .expect("failed to run cdb get");
    assert_eq!(output.status.code(), Some(100));
    assert!(output.stdout.is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// --wide
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn wide_flag_builds_and_reads_the_64_bit_variant() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("records.txt");
    let db = dir.path().join("wide.cdb");
    fs::write(&input, RECORDS).unwrap();

    let status = Command::new(cdb_bin())
        .args(["--wide", "make", db.to_str().unwrap(), input.to_str().unwrap()])
        .status()
        .unwrap();
    assert!(status.success());

    let output = Command::new(cdb_bin())
        .args(["--wide", "get", db.to_str().unwrap(), "two"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(output.stdout, b"22\n");

    // Without --wide the same file reads as a narrow db with no records.
    let output = Command::new(cdb_bin())
        .args(["get", db.to_str().unwrap(), "two"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(100));
}

// ─────────────────────────────────────────────────────────────────────────────
// stdin
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn make_reads_stdin_when_no_input_is_given() {
    use std::io::Write;
    use std::process::Stdio;

    let dir = TempDir::new().unwrap();
    let db = dir.path().join("stdin.cdb");

    let mut child = Command::new(cdb_bin())
        .args(["make", db.to_str().unwrap()])
        .stdin(Stdio::piped())
        .spawn()
        .expect("failed to spawn cdb make");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"+1,1:k->v\n\n")
        .unwrap();
    assert!(child.wait().unwrap().success());

    let output = Command::new(cdb_bin())
        .args(["get", db.to_str().unwrap(), "k"])
        .output()
        .unwrap();
    assert_eq!(output.stdout, b"v\n");
}
