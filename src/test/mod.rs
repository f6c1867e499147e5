use std::collections::HashMap;

use crate::Value::{self, Counted, Empty, List, Plain, Switch};
use crate::{ArgvMap, Docopt, Error};

pub fn get_args(doc: &str, argv: &[&'static str]) -> ArgvMap {
    let dopt = match Docopt::new(doc) {
        Err(err) => panic!("Invalid usage: {}", err),
        Ok(dopt) => dopt,
    };
    match dopt.argv(vec!["prog"].iter().chain(argv.iter()).cloned()).parse() {
        Err(err) => panic!("{}", err),
        Ok(vals) => vals,
    }
}

pub fn map_from_alist(alist: Vec<(&'static str, Value)>) -> HashMap<String, Value> {
    alist.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

pub fn same_args(expected: &HashMap<String, Value>, got: &ArgvMap) {
    for (k, ve) in expected {
        match got.map.get(k) {
            None => panic!("EXPECTED has '{}' but GOT does not.", k),
            Some(vg) => {
                assert_eq!(ve, vg, "{}: EXPECTED != GOT", k);
            }
        }
    }
    for (k, vg) in &got.map {
        match expected.get(k) {
            None => panic!("GOT has '{}' but EXPECTED does not.", k),
            Some(ve) => {
                assert_eq!(vg, ve, "{}: GOT != EXPECTED", k);
            }
        }
    }
}

macro_rules! test_expect {
    ($name:ident, $doc:expr, $args:expr, $expected:expr) => {
        #[test]
        fn $name() {
            let vals = get_args($doc, $args);
            let expected = map_from_alist($expected);
            same_args(&expected, &vals);
        }
    };
}

macro_rules! test_user_error {
    ($name:ident, $doc:expr, $args:expr) => {
        #[test]
        #[should_panic]
        fn $name() {
            get_args($doc, $args);
        }
    };
}

test_expect!(test_issue_13, "Usage: prog file <file>", &["file", "file"],
             vec![("file", Switch(true)),
                  ("<file>", Plain("file".to_string()))]);

test_expect!(test_issue_129, "Usage: prog [options]

Options:
    --foo ARG   Foo foo.",
             &["--foo=a b"],
             vec![("--foo", Plain("a b".into()))]);

#[test]
fn matching_is_idempotent() {
    let doc = "Usage: prog [-a] <x>

Options: -a  All.";
    let first = get_args(doc, &["-a", "ocean"]);
    let second = get_args(doc, &["-a", "ocean"]);
    assert_eq!(first.map, second.map);
}

#[test]
fn cluster_matches_like_separate_flags() {
    let doc = "Usage: prog [options]

Options:
  -a  All.
  -b  Both.";
    let clustered = get_args(doc, &["-ab"]);
    let separate = get_args(doc, &["-a", "-b"]);
    assert_eq!(clustered.map, separate.map);
    assert!(clustered.get_bool("-a") && clustered.get_bool("-b"));
}

#[test]
fn value_casts_are_strict() {
    use crate::{CastError, Kind};

    assert_eq!(Counted(3).as_count(), Ok(3));
    assert_eq!(Plain("10".into()).as_count(), Ok(10));
    assert_eq!(Plain("-7".into()).as_count(), Ok(-7));
    assert_eq!(
        Plain("10k".into()).as_count(),
        Err(CastError::NonNumeric("10k".into()))
    );
    assert_eq!(Switch(true).as_switch(), Ok(true));
    let list = List(vec!["a".into()]);
    assert_eq!(list.as_list().unwrap(), &["a".to_string()][..]);
    assert_eq!(
        List(vec![]).as_str(),
        Err(CastError::IllegalCast { expected: Kind::Plain, actual: Kind::List })
    );
    assert_eq!(
        Empty.as_switch(),
        Err(CastError::IllegalCast { expected: Kind::Switch, actual: Kind::Empty })
    );
    assert!(!Empty.has_value());
    assert!(Switch(false).has_value());
}

#[test]
fn help_takes_priority_over_matching() {
    let doc = "Usage: prog <required>";
    let err = Docopt::new(doc)
        .unwrap()
        .argv(["prog", "--help"])
        .parse()
        .unwrap_err();
    assert!(!err.fatal());
    match err {
        Error::WithProgramUsage(inner, usage) => {
            assert!(matches!(*inner, Error::Help));
            // Help prints the entire doc, not just the usage section.
            assert!(usage.contains("Usage: prog <required>"));
        }
        err => panic!("expected help, got {:?}", err),
    }
}

#[test]
fn help_can_be_disabled() {
    let doc = "Usage: prog [--help]";
    let args = Docopt::new(doc)
        .unwrap()
        .help(false)
        .argv(["prog", "--help"])
        .parse()
        .unwrap();
    assert!(args.get_bool("--help"));
}

#[test]
fn version_requested() {
    let err = Docopt::new("Usage: prog")
        .unwrap()
        .version(Some("0.1.2".into()))
        .argv(["prog", "--version"])
        .parse()
        .unwrap_err();
    assert!(!err.fatal());
    match err {
        Error::Version(v) => assert_eq!(v, "0.1.2"),
        err => panic!("expected version, got {:?}", err),
    }
}

#[test]
fn version_ignored_when_unset() {
    let err = Docopt::new("Usage: prog")
        .unwrap()
        .argv(["prog", "--version"])
        .parse()
        .unwrap_err();
    assert!(err.fatal());
}

#[test]
fn doc_without_usage_is_a_usage_error() {
    match Docopt::new("Just some prose.") {
        Err(Error::Usage(..)) => {}
        result => panic!("expected usage error, got {:?}", result.map(|_| ())),
    }
}

#[test]
fn doc_with_two_usage_sections_is_a_usage_error() {
    match Docopt::new("Usage: prog\n\nusage: prog again") {
        Err(Error::Usage(..)) => {}
        result => panic!("expected usage error, got {:?}", result.map(|_| ())),
    }
}

#[test]
fn mismatched_bracket_is_a_usage_error() {
    match Docopt::new("Usage: prog [foo") {
        Err(Error::Usage(msg)) => assert!(msg.contains("Mismatched")),
        result => panic!("expected usage error, got {:?}", result.map(|_| ())),
    }
}

#[test]
fn stray_close_bracket_is_a_usage_error() {
    // The stray `]` ends the implicit top-level group early.
    match Docopt::new("Usage: prog ]") {
        Err(Error::Usage(msg)) => assert!(msg.contains("Mismatched")),
        result => panic!("expected usage error, got {:?}", result.map(|_| ())),
    }
}

#[test]
fn trailing_tokens_are_a_usage_error() {
    match Docopt::new("Usage: prog a ) b") {
        Err(Error::Usage(msg)) => assert!(msg.contains("Unexpected ending")),
        result => panic!("expected usage error, got {:?}", result.map(|_| ())),
    }
}

mod suggestions;
