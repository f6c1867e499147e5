//! The driver: a usage string in, an argv in, a value map out.

use std::collections::HashMap;
use std::fmt;

use log::debug;
use strsim::levenshtein;

use crate::errors::Error;
use crate::errors::Error::{Argv, Help, NoMatch, Usage, Version, WithProgramUsage};
use crate::parse::Parser;
use crate::pattern::Leaf;
use crate::value::Value;

/// The main type, which is constructed with a usage string.
///
/// This can be used to match command line arguments to produce an
/// `ArgvMap`.
#[derive(Clone, Debug)]
pub struct Docopt {
    p: Parser,
    argv: Option<Vec<String>>,
    options_first: bool,
    help: bool,
    version: Option<String>,
}

impl Docopt {
    /// Parse the usage string given.
    ///
    /// The `Docopt` value returned may be used immediately to parse command
    /// line arguments with a default configuration.
    ///
    /// If there was a problem parsing the usage string, a `Usage` error is
    /// returned.
    pub fn new<S>(usage: S) -> Result<Docopt, Error>
    where
        S: ::std::ops::Deref<Target = str>,
    {
        Parser::new(usage.deref()).map_err(Usage).map(|p| Docopt {
            p,
            argv: None,
            options_first: false,
            help: true,
            version: None,
        })
    }

    /// Parse command line arguments and try to match them against a usage
    /// pattern specified in the usage string.
    ///
    /// If there is a match, then an `ArgvMap` is returned, which maps
    /// flags, commands and arguments to values.
    ///
    /// If parsing the command line arguments fails, then an `Argv` error is
    /// returned. If parsing succeeds but there is no match, then a
    /// `NoMatch` error is returned. Both of these errors are always
    /// returned inside a `WithProgramUsage` error.
    ///
    /// If special handling of `help` or `version` is enabled (the former is
    /// enabled by default), then `Help` or `Version` errors are returned if
    /// `-h`/`--help` or `--version` is present, without requiring the rest
    /// of argv to match.
    pub fn parse(&self) -> Result<ArgvMap, Error> {
        let argv = self.argv.clone().unwrap_or_else(Docopt::get_argv);
        let pargv = self
            .p
            .parse_argv(argv, self.options_first)
            .map_err(|s| self.err_with_usage(Argv(s)))?;
        if self.help && pargv.flag_is_set(&["-h", "--help"]) {
            return Err(self.err_with_full_doc(Help));
        }
        if let Some(ref version) = self.version {
            if pargv.flag_is_set(&["--version"]) {
                return Err(Version(version.clone()));
            }
        }
        let (matched, left, collected) = self.p.match_argv(&pargv.patterns);
        if matched && left.is_empty() {
            return Ok(ArgvMap { map: self.p.result_map(collected) });
        }
        debug!("argv rejected: matched={} unknown={:?}", matched, pargv.unknown);
        Err(self.err_with_usage(self.match_error(matched, &left, &pargv.unknown)))
    }

    /// Set the argv to be used for parsing.
    ///
    /// By default, when no argv is set, it is automatically taken from
    /// `std::env::args()`.
    ///
    /// The `argv` given *must* be the full set of `argv` passed to the
    /// program. e.g., `["cp", "src", "dest"]` is right while
    /// `["src", "dest"]` is wrong.
    pub fn argv<I, S>(mut self, argv: I) -> Docopt
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.argv = Some(
            argv.into_iter()
                .skip(1)
                .map(|s| s.as_ref().to_owned())
                .collect(),
        );
        self
    }

    /// Enables the "options first" behavior.
    ///
    /// The options first behavior means that all flags *must* appear before
    /// positional arguments. That is, after the first positional argument
    /// is seen, all proceeding arguments are interpreted as positional
    /// arguments unconditionally.
    pub fn options_first(mut self, yes: bool) -> Docopt {
        self.options_first = yes;
        self
    }

    /// Enables automatic handling of `-h` and `--help`.
    ///
    /// When this is enabled and either flag appears anywhere in the
    /// arguments, then a `Help` error will be returned. You may then use
    /// the `exit` method on the error value to conveniently quit the
    /// program (which will print the full usage string to stdout).
    ///
    /// When disabled, there is no special handling of `--help`.
    pub fn help(mut self, yes: bool) -> Docopt {
        self.help = yes;
        self
    }

    /// Enables automatic handling of `--version`.
    ///
    /// When this is enabled and `--version` appears anywhere in the
    /// arguments, then a `Version(s)` error will be returned, where `s` is
    /// the string given here. You may then use the `exit` method on the
    /// error value to conveniently quit the program (which will print the
    /// version to stdout).
    ///
    /// When disabled (a `None` value), there is no special handling of
    /// `--version`.
    pub fn version(mut self, version: Option<String>) -> Docopt {
        self.version = version;
        self
    }

    fn match_error(&self, matched: bool, left: &[Leaf], unknown: &[String]) -> Error {
        if let Some(flag) = unknown.first() {
            return Argv(match self.suggest(flag) {
                Some(best) => {
                    format!("Unknown flag: '{}'. Did you mean '{}'?", flag, best)
                }
                None => format!("Unknown flag: '{}'", flag),
            });
        }
        if matched {
            // The pattern matched but argv had more to give.
            let toks: Vec<String> = left.iter().map(|l| l.to_string()).collect();
            for tok in &toks {
                if let Some(best) = self.suggest(tok) {
                    return Argv(format!(
                        "Unknown command: '{}'. Did you mean '{}'?",
                        tok, best
                    ));
                }
            }
            return Argv(format!("Unexpected argument: {}", toks.join(", ")));
        }
        NoMatch
    }

    fn suggest(&self, unknown: &str) -> Option<String> {
        let mut best: Option<(usize, String)> = None;
        for candidate in self.p.suggest_candidates() {
            let dist = levenshtein(unknown, &candidate);
            if dist > 0 && dist < 3 && best.as_ref().map_or(true, |&(d, _)| dist < d) {
                best = Some((dist, candidate));
            }
        }
        best.map(|(_, name)| name)
    }

    fn err_with_usage(&self, e: Error) -> Error {
        WithProgramUsage(Box::new(e), self.p.usage.trim().into())
    }

    fn err_with_full_doc(&self, e: Error) -> Error {
        WithProgramUsage(Box::new(e), self.p.full_doc.trim().into())
    }

    fn get_argv() -> Vec<String> {
        ::std::env::args().skip(1).collect()
    }
}

/// A map containing matched values from command line arguments.
///
/// The keys are just as specified in the usage string: `--flag` for a long
/// flag (the long form is the key even when a short synonym exists), `-f`
/// for a short flag without a long form, `ARG` or `<arg>` for a positional
/// argument and `cmd` for a command.
#[derive(Clone)]
pub struct ArgvMap {
    #[doc(hidden)]
    pub map: HashMap<String, Value>,
}

impl ArgvMap {
    /// Return the raw value corresponding to some `key`.
    ///
    /// `key` should be a string in the traditional format. e.g., `<arg>`
    /// or `--flag`.
    pub fn find(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    /// True when the value under `key` is set: a switch that was given, a
    /// nonzero count, a captured string or a non-empty list.
    pub fn get_bool(&self, key: &str) -> bool {
        self.find(key).map_or(false, |v| match *v {
            Value::Empty => false,
            Value::Switch(b) => b,
            Value::Counted(n) => n > 0,
            Value::Plain(_) => true,
            Value::List(ref vs) => !vs.is_empty(),
        })
    }

    /// Finds the value corresponding to `key` as a count of the number of
    /// times it occurred. If the key does not exist, `0` is returned.
    pub fn get_count(&self, key: &str) -> i64 {
        self.find(key).map_or(0, |v| match *v {
            Value::Empty => 0,
            Value::Switch(b) => b as i64,
            Value::Counted(n) => n,
            Value::Plain(_) => 1,
            Value::List(ref vs) => vs.len() as i64,
        })
    }

    /// Finds the string under `key`. If the key does not exist or does not
    /// hold a string, `""` is returned.
    pub fn get_str(&self, key: &str) -> &str {
        self.find(key).map_or("", |v| match *v {
            Value::Plain(ref s) => s.as_str(),
            _ => "",
        })
    }

    /// Finds the list under `key`. A plain string is a list of length one;
    /// anything else is empty.
    pub fn get_vec(&self, key: &str) -> Vec<&str> {
        self.find(key).map_or(vec![], |v| match *v {
            Value::Plain(ref s) => vec![s.as_str()],
            Value::List(ref vs) => vs.iter().map(|s| s.as_str()).collect(),
            _ => vec![],
        })
    }

    /// Return the number of values.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl fmt::Debug for ArgvMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.map.is_empty() {
            return write!(f, "{{EMPTY}}");
        }

        // Sort keys for predictable output.
        let mut keys: Vec<&String> = self.map.keys().collect();
        keys.sort();
        let mut first = true;
        for k in keys {
            if !first {
                writeln!(f)?;
            } else {
                first = false;
            }
            write!(f, "{} => {}", k, self.map[k])?;
        }
        Ok(())
    }
}
