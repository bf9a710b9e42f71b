//! Binary entry point for the `cdb` command-line tool.
//!
//! Parses the subcommand, then runs it once for the selected file width.
//! Every operation is generic over [`Pair`]; `--wide` picks [`Pair64`] at
//! dispatch time.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cdb::cli::args::{Cli, Command};
use cdb::cli::record::{self, RecordReader};
use cdb::{FileReader, Pair, Pair32, Pair64, Writer};

/// Exit status of `get` when the key is absent (cdbget convention).
const EXIT_ABSENT: u8 = 100;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = if cli.wide {
        run::<Pair64>(cli.command)
    } else {
        run::<Pair32>(cli.command)
    };
    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("cdb: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run<P: Pair>(command: Command) -> Result<ExitCode> {
    match command {
        Command::Make { cdb, input } => make::<P>(&cdb, input.as_deref()),
        Command::Dump { cdb } => dump::<P>(&cdb),
        Command::Get { cdb, key, all } => get::<P>(&cdb, key.as_bytes(), all),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// make
// ─────────────────────────────────────────────────────────────────────────────

fn make<P: Pair>(cdb: &Path, input: Option<&Path>) -> Result<ExitCode> {
    let mut tmp = cdb.as_os_str().to_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let built = build_into::<P>(&tmp, input);
    if built.is_err() {
        // The torn build must not survive; the real path was never touched.
        let _ = fs::remove_file(&tmp);
    }
    built?;

    fs::rename(&tmp, cdb)
        .with_context(|| format!("rename {} to {}", tmp.display(), cdb.display()))?;
    Ok(ExitCode::SUCCESS)
}

fn build_into<P: Pair>(tmp: &Path, input: Option<&Path>) -> Result<()> {
    let source: Box<dyn BufRead> = match input {
        Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("open {}", path.display()))?,
        )),
        _ => Box::new(io::stdin().lock()),
    };

    let file = File::create(tmp).with_context(|| format!("create {}", tmp.display()))?;
    let mut writer = Writer::<_, P>::new(BufWriter::new(file))?;
    for record in RecordReader::new(source) {
        let (key, value) = record?;
        writer.put(&key, &value)?;
    }

    let sink = writer.finalize()?;
    let file = sink.into_inner().map_err(|err| err.into_error())?;
    // Data must be on disk before the rename publishes the file.
    file.sync_all()
        .with_context(|| format!("sync {}", tmp.display()))?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// dump
// ─────────────────────────────────────────────────────────────────────────────

fn dump<P: Pair>(cdb: &Path) -> Result<ExitCode> {
    let db = FileReader::<P>::open(cdb).with_context(|| format!("open {}", cdb.display()))?;
    let reader = db.as_reader();

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    for (key, value) in reader.iter() {
        record::write_record(&mut out, key, value)?;
    }
    record::write_terminator(&mut out)?;
    out.flush()?;
    Ok(ExitCode::SUCCESS)
}

// ─────────────────────────────────────────────────────────────────────────────
// get
// ─────────────────────────────────────────────────────────────────────────────

fn get<P: Pair>(cdb: &Path, key: &[u8], all: bool) -> Result<ExitCode> {
    let db = FileReader::<P>::open(cdb).with_context(|| format!("open {}", cdb.display()))?;
    let reader = db.as_reader();

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);
    let mut found = 0usize;
    for value in reader.get_all(key) {
        out.write_all(value)?;
        out.write_all(b"\n")?;
        found += 1;
        if !all {
            break;
        }
    }
    out.flush()?;
    if found == 0 {
        return Ok(ExitCode::from(EXIT_ABSENT));
    }
    Ok(ExitCode::SUCCESS)
}
