//! Command-line definition for the `cdb` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Constant-database tools: build, dump, and query cdb files.
#[derive(Debug, Parser)]
#[command(name = "cdb", version, about)]
pub struct Cli {
    /// Use the 64-bit file variant (16-byte pairs, no 4 GiB cap).
    #[arg(long, global = true)]
    pub wide: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a database from cdbmake-format records.
    ///
    /// Records are read as `+klen,dlen:key->value` lines ending with a blank
    /// line.  The database is written to `<CDB>.tmp` and renamed into place
    /// on success, so an interrupted build never leaves a torn file.
    Make {
        /// Database file to create.
        cdb: PathBuf,
        /// Record stream; `-` or absent reads standard input.
        input: Option<PathBuf>,
    },

    /// Print every record in cdbmake format, in insertion order.
    ///
    /// The output is a complete record stream: feeding it back into `make`
    /// reproduces an identical database.
    Dump {
        /// Database file to read.
        cdb: PathBuf,
    },

    /// Print the value stored under a key.
    ///
    /// Exits with status 100 when the key is absent.
    Get {
        /// Database file to read.
        cdb: PathBuf,
        /// Key to look up.
        key: String,
        /// Print every value stored under the key, not just the first.
        #[arg(short, long)]
        all: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_make_with_defaults() {
        let cli = Cli::parse_from(["cdb", "make", "data.cdb"]);
        assert!(!cli.wide);
        match cli.command {
            Command::Make { cdb, input } => {
                assert_eq!(cdb, PathBuf::from("data.cdb"));
                assert!(input.is_none());
            }
            other => panic!("wrong command: {other:?}"),
        }
    }

    #[test]
    fn wide_flag_is_global() {
        let cli = Cli::parse_from(["cdb", "get", "--wide", "data.cdb", "k"]);
        assert!(cli.wide);
        let cli = Cli::parse_from(["cdb", "--wide", "dump", "data.cdb"]);
        assert!(cli.wide);
    }

    #[test]
    fn get_all_flag() {
        let cli = Cli::parse_from(["cdb", "get", "data.cdb", "k", "-a"]);
        match cli.command {
            Command::Get { all, key, .. } => {
                assert!(all);
                assert_eq!(key, "k");
            }
            other => panic!("wrong command: {other:?}"),
        }
    }
}
