//! The `cdb` command-line tool.
//!
//! Subcommand layer over the library, covering the classic cdb tool family:
//! `make` (build a database from textual records), `dump` (emit every record
//! as text, in insertion order), and `get` (point lookup).  The textual
//! record format is shared by `make` and `dump`, so a dump can be fed
//! straight back into a make.

pub mod args;
pub mod record;
