use crate::{Docopt, Error};

fn get_error(doc: &str, argv: &[&'static str]) -> Error {
    let dopt = match Docopt::new(doc) {
        Err(err) => panic!("Invalid usage: {}", err),
        Ok(dopt) => dopt,
    };
    match dopt.argv(vec!["prog"].iter().chain(argv.iter()).cloned()).parse() {
        Err(err) => err,
        Ok(_) => panic!("Should have been a user error"),
    }
}

macro_rules! test_suggest {
    ($name:ident, $doc:expr, $args:expr, $expected:expr) => {
        #[test]
        fn $name() {
            match get_error($doc, $args) {
                Error::WithProgramUsage(inner, _) => match *inner {
                    Error::Argv(msg) => assert_eq!(msg, $expected),
                    err => panic!("Error other than argv: {:?}", err),
                },
                err => panic!("Error without program usage: {:?}", err),
            }
        }
    };
}

test_suggest!(test_suggest_1, "Usage: prog [--release]", &["--relaese"],
              "Unknown flag: '--relaese'. Did you mean '--release'?");

test_suggest!(test_suggest_2,
"Usage: prog [-a] <source> <dest>

Options:
    -a, --archive  Copy everything.
",
&["-d"], "Unknown flag: '-d'");

test_suggest!(test_suggest_3,
"Usage: prog [--import] [--complete]
",
&["--mport", "--complte"], "Unknown flag: '--mport'. Did you mean '--import'?");

test_suggest!(test_suggest_4,
"Usage: prog [--import] [--complete]
",
&["--import", "--complte"], "Unknown flag: '--complte'. Did you mean '--complete'?");

test_suggest!(test_suggest_5,
"Usage: cargo owner [options]

Options:
    -h, --help               Print this message
    -a, --add LOGIN          Name of a user or team to add as an owner
    -r, --remove LOGIN       Name of a user or team to remove as an owner
    -l, --list               List owners of a crate
",
&["owner", "add"], "Unknown command: 'add'. Did you mean '--add'?");

test_suggest!(test_suggest_6,
"Usage: cargo owner [options]

Options:
    -h, --help               Print this message
    -a, --add LOGIN          Name of a user or team to add as an owner
    -r, --remove LOGIN       Name of a user or team to remove as an owner
    -l, --list               List owners of a crate
",
&["owner", "list"], "Unknown command: 'list'. Did you mean '--list'?");

test_suggest!(ambiguous_prefix_names_candidates,
"Usage: prog [--flag] [--flame]
",
&["--fl"], "'--fl' is not a unique prefix: --flag, --flame");
