//! Derive a command line argument parser from the help text itself.
//!
//! The usage string you would write for `--help` *is* the grammar: its
//! `usage:` section declares the patterns a command line may take and its
//! `options:` section describes each flag, its argument and its default.
//! Matching an argv against that grammar yields a map from every name in
//! the usage string (`--flag`, `<arg>`, `ARG`, `cmd`) to a typed
//! [`Value`].
//!
//! # Example
//!
//! ```
//! use docopt::Docopt;
//!
//! const USAGE: &str = "
//! Usage: cp [-a] <source> <dest>
//!        cp [-a] --into <dir> <source>...
//!
//! Options:
//!     -a, --archive  Copy everything.
//!     --into <dir>   Target directory.
//! ";
//!
//! let argv = ["cp", "-a", "--into", "dest/", "file1", "file2"];
//! let args = Docopt::new(USAGE)
//!     .and_then(|d| d.argv(argv).parse())
//!     .unwrap_or_else(|e| e.exit());
//! assert!(args.get_bool("--archive"));
//! assert_eq!(args.get_str("--into"), "dest/");
//! assert_eq!(args.get_vec("<source>"), vec!["file1", "file2"]);
//! ```
//!
//! In a real program the `argv` call is usually omitted, in which case the
//! arguments are taken from the environment. `-h`/`--help` and
//! `--version` are handled for you: they surface as non-fatal errors that
//! `Error::exit` turns into a message on stdout and a zero exit status.

pub use crate::dopt::{ArgvMap, Docopt};
pub use crate::errors::{Error, Result};
pub use crate::value::{CastError, Kind, Value};

#[macro_use]
mod utils;

mod dopt;
mod errors;
mod parse;
mod pattern;
mod tokens;
mod value;

#[cfg(test)]
mod test;
