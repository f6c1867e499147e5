//! Parsing of the doc string and of user argv.
//!
//! A doc string is compiled in stages: locate the `usage:` and `options:`
//! sections, read the option descriptors, reshape the usage lines into one
//! alternation, parse that with a recursive descent over the tokenized
//! grammar, resolve `[options]` shortcuts and normalize the tree. The
//! resulting `Parser` can then turn any argv into a flat list of pattern
//! leaves and match it.
//!
//! All routines here report failures as plain strings; the driver decides
//! whether they are usage errors (bad doc) or argv errors (bad input).

use std::collections::HashMap;
use std::fmt;

use log::debug;
use regex::Regex;

use crate::pattern::{Leaf, Opt, Pattern, PatternList, PatternTree};
use crate::tokens::Tokens;
use crate::value::Value;

macro_rules! err {
    ($($arg:tt)*) => (return Err(format!($($arg)*)))
}

decl_regex! {
    RE_DEFAULT: r"(?i)\[default: (.*)\]";
}

/// The compiled form of a doc string: the normalized pattern tree plus the
/// option catalog, ready to be matched against any number of argvs.
#[derive(Clone, Debug)]
pub struct Parser {
    pub program: String,
    pub full_doc: String,
    pub usage: String,
    tree: PatternTree,
    options: Vec<Opt>,
}

impl Parser {
    pub fn new(doc: &str) -> Result<Parser, String> {
        let mut usage_sections = parse_section("usage:", doc);
        if usage_sections.is_empty() {
            err!("'usage:' (case-insensitive) not found.")
        }
        if usage_sections.len() > 1 {
            err!("More than one 'usage:' (case-insensitive).")
        }
        let usage = usage_sections.swap_remove(0);

        let descs = parse_defaults(doc);
        let mut options = descs.clone();
        let mut leaves = vec![];
        let formal = formal_usage(&usage);
        debug!("formal usage: {}", formal);
        let root = parse_pattern(&formal, &mut options, &mut leaves)?;

        let mut tree = PatternTree::new(root, leaves);
        tree.resolve_options_shortcut(&descs);
        tree.fix();

        Ok(Parser {
            program: program_name(&usage),
            full_doc: doc.to_owned(),
            usage,
            tree,
            options,
        })
    }

    /// Parses user argv into pattern leaves. The catalog is cloned first:
    /// flags discovered only in argv grow the per-call copy and are
    /// remembered as unknown for error reporting.
    pub fn parse_argv(&self, argv: Vec<String>, options_first: bool) -> Result<Argv, String> {
        let mut options = self.options.clone();
        let patterns = parse_argv_tokens(Tokens::from_argv(argv), &mut options, options_first)?;
        let unknown = patterns
            .iter()
            .filter_map(|leaf| match leaf {
                Leaf::Option(o) if !self.knows_option(o.name()) => {
                    Some(o.name().to_owned())
                }
                _ => None,
            })
            .collect();
        Ok(Argv { patterns, unknown })
    }

    pub fn match_argv(&self, patterns: &[Leaf]) -> (bool, Vec<Leaf>, Vec<Leaf>) {
        self.tree.matches(patterns)
    }

    /// The result map: the post-normalization default of every leaf in the
    /// tree, overlaid with the collected leaves.
    pub fn result_map(&self, collected: Vec<Leaf>) -> HashMap<String, Value> {
        let mut map = HashMap::new();
        for leaf in self.tree.tree_leaves() {
            map.insert(leaf.name().to_owned(), leaf.value().clone());
        }
        for leaf in collected {
            map.insert(leaf.name().to_owned(), leaf.value().clone());
        }
        map
    }

    /// Names a typo could be aiming at: commands from the usage line and
    /// the long form of every cataloged option.
    pub fn suggest_candidates(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tree
            .tree_leaves()
            .iter()
            .filter_map(|leaf| match leaf {
                Leaf::Command { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect();
        for opt in &self.options {
            if !opt.long.is_empty() {
                names.push(opt.long.clone());
            }
        }
        names
    }

    fn knows_option(&self, name: &str) -> bool {
        self.options.iter().any(|o| o.name() == name)
    }
}

impl fmt::Display for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Program: {}", self.program)?;
        writeln!(f, "Options:")?;
        for opt in &self.options {
            writeln!(f, "  {:?}", opt)?;
        }
        write!(f, "Pattern: {:?}", self.tree)
    }
}

/// Parsed user argv: the flat pattern leaves plus the names of any flags
/// that no part of the doc declares.
#[derive(Debug)]
pub struct Argv {
    pub patterns: Vec<Leaf>,
    pub unknown: Vec<String>,
}

impl Argv {
    /// True when a parsed flag with one of the given names carries a value.
    /// Drives the help/version short-circuit, which runs before matching.
    pub fn flag_is_set(&self, names: &[&str]) -> bool {
        self.patterns.iter().any(|leaf| match leaf {
            Leaf::Option(o) => names.contains(&o.name()) && o.value.has_value(),
            _ => false,
        })
    }
}

/// Extracts every block made of a line containing `name` plus its indented
/// continuation lines. Matching is case-insensitive.
fn parse_section(name: &str, source: &str) -> Vec<String> {
    let re = Regex::new(&format!(
        r"(?mi)^[^\n]*{}[^\n]*(?:\n[ \t][^\n]*)*",
        regex::escape(name),
    ))
    .unwrap();
    re.find_iter(source)
        .map(|m| m.as_str().trim().to_owned())
        .collect()
}

/// Rewrites a usage section as a single alternation. The first word after
/// `usage:` is the program name, and every later occurrence of it starts a
/// new alternative: `usage: prog a\n  prog b` becomes `( a ) | ( b )`.
fn formal_usage(section: &str) -> String {
    let tail = after_colon(section);
    let mut parts = tail.split_whitespace();
    let prog = parts.next().unwrap_or("");
    let mut formal = String::from("(");
    for part in parts {
        if part == prog {
            formal.push_str(" ) | (");
        } else {
            formal.push(' ');
            formal.push_str(part);
        }
    }
    formal.push_str(" )");
    formal
}

fn program_name(section: &str) -> String {
    after_colon(section)
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_owned()
}

fn after_colon(section: &str) -> &str {
    match section.find(':') {
        Some(i) => &section[i + 1..],
        None => section,
    }
}

/// expr ::= seq ( '|' seq )*
/// seq  ::= ( atom [ '...' ] )*
/// atom ::= '(' expr ')' | '[' expr ']' | 'options'
///        | long | shorts | argument | command
fn parse_pattern(
    source: &str,
    options: &mut Vec<Opt>,
    leaves: &mut Vec<Leaf>,
) -> Result<Pattern, String> {
    let mut tokens = Tokens::from_pattern(source);
    let result = parse_expr(&mut tokens, options, leaves)?;
    if tokens.has_more() {
        err!("Unexpected ending: '{}'", tokens.the_rest())
    }
    Ok(Pattern::Required(result))
}

fn parse_expr(
    tokens: &mut Tokens,
    options: &mut Vec<Opt>,
    leaves: &mut Vec<Leaf>,
) -> Result<PatternList, String> {
    let mut seq = parse_seq(tokens, options, leaves)?;
    if tokens.current() != "|" {
        return Ok(seq);
    }
    let mut alternatives = vec![collapse_to_required(seq)];
    while tokens.current() == "|" {
        tokens.pop();
        seq = parse_seq(tokens, options, leaves)?;
        alternatives.push(collapse_to_required(seq));
    }
    Ok(vec![collapse_to_either(alternatives)])
}

fn parse_seq(
    tokens: &mut Tokens,
    options: &mut Vec<Opt>,
    leaves: &mut Vec<Leaf>,
) -> Result<PatternList, String> {
    let mut seq = vec![];
    while tokens.has_more() {
        if matches!(tokens.current(), "]" | ")" | "|") {
            break;
        }
        let atom = parse_atom(tokens, options, leaves)?;
        if tokens.current() == "..." {
            tokens.pop();
            seq.push(Pattern::OneOrMore(Box::new(collapse_to_required(atom))));
        } else {
            seq.extend(atom);
        }
    }
    Ok(seq)
}

fn parse_atom(
    tokens: &mut Tokens,
    options: &mut Vec<Opt>,
    leaves: &mut Vec<Leaf>,
) -> Result<PatternList, String> {
    let token = tokens.current().to_owned();
    if token == "[" {
        tokens.pop();
        let expr = parse_expr(tokens, options, leaves)?;
        if tokens.pop() != "]" {
            err!("Mismatched '['")
        }
        Ok(vec![Pattern::Optional(expr)])
    } else if token == "(" {
        tokens.pop();
        let expr = parse_expr(tokens, options, leaves)?;
        if tokens.pop() != ")" {
            err!("Mismatched '('")
        }
        Ok(vec![Pattern::Required(expr)])
    } else if token == "options" {
        tokens.pop();
        Ok(vec![Pattern::OptionsShortcut(vec![])])
    } else if token.starts_with("--") && token != "--" {
        Ok(intern(parse_long(tokens, options)?, leaves))
    } else if token.starts_with('-') && token != "-" && token != "--" {
        Ok(intern(parse_short(tokens, options)?, leaves))
    } else if is_argument_spec(&token) {
        let tok = tokens.pop();
        leaves.push(Leaf::argument(&tok, Value::Empty));
        Ok(vec![Pattern::Leaf(leaves.len() - 1)])
    } else {
        // Bare words, including lone `-` and `--`, are commands.
        let tok = tokens.pop();
        leaves.push(Leaf::command(&tok));
        Ok(vec![Pattern::Leaf(leaves.len() - 1)])
    }
}

fn intern(parsed: Vec<Leaf>, leaves: &mut Vec<Leaf>) -> PatternList {
    parsed
        .into_iter()
        .map(|leaf| {
            leaves.push(leaf);
            Pattern::Leaf(leaves.len() - 1)
        })
        .collect()
}

fn collapse_to_required(mut seq: PatternList) -> Pattern {
    if seq.len() == 1 {
        seq.remove(0)
    } else {
        Pattern::Required(seq)
    }
}

fn collapse_to_either(mut alternatives: PatternList) -> Pattern {
    if alternatives.len() == 1 {
        alternatives.remove(0)
    } else {
        Pattern::Either(alternatives)
    }
}

/// A token names a positional argument when it is `<bracketed>` or written
/// entirely in upper case.
fn is_argument_spec(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if token.starts_with('<') && token.ends_with('>') {
        return true;
    }
    token.chars().all(|c| c.is_uppercase())
}

/// Parses `--flag[=value]` from the stream, resolving it against the
/// catalog. In argv mode a unique prefix of a known long flag is accepted,
/// and unknown flags are synthesized into the catalog rather than failing
/// here.
fn parse_long(tokens: &mut Tokens, options: &mut Vec<Opt>) -> Result<Vec<Leaf>, String> {
    let token = tokens.pop();
    let (long, mut val) = match token.split_once('=') {
        Some((name, v)) => (name.to_owned(), Some(v.to_owned())),
        None => (token, None),
    };
    debug_assert!(long.starts_with("--"));

    let mut similar: Vec<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.long == long)
        .map(|(i, _)| i)
        .collect();
    if tokens.is_parsing_argv() && similar.is_empty() {
        similar = options
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.long.is_empty() && o.long.starts_with(&long))
            .map(|(i, _)| i)
            .collect();
    }

    if similar.len() > 1 {
        let names: Vec<&str> = similar.iter().map(|&i| options[i].long.as_str()).collect();
        err!("'{}' is not a unique prefix: {}", long, names.join(", "))
    }

    let opt = if similar.is_empty() {
        let argcount = if val.is_some() { 1 } else { 0 };
        options.push(Opt::new("", &long, argcount, Value::Switch(false)));
        let mut opt = options[options.len() - 1].clone();
        if tokens.is_parsing_argv() {
            opt.value = match val {
                Some(v) if argcount > 0 => Value::Plain(v),
                _ => Value::Switch(true),
            };
        }
        opt
    } else {
        let mut opt = options[similar[0]].clone();
        if opt.argcount == 0 {
            if val.is_some() {
                err!("Flag '{}' must not have an argument.", opt.long)
            }
        } else if val.is_none() {
            let current = tokens.current();
            if current.is_empty() || current == "--" {
                err!("Flag '{}' requires an argument.", opt.long)
            }
            val = Some(tokens.pop());
        }
        if tokens.is_parsing_argv() {
            opt.value = match val {
                Some(v) => Value::Plain(v),
                None => Value::Switch(true),
            };
        }
        opt
    };
    Ok(vec![Leaf::Option(opt)])
}

/// Parses a short-option cluster `-abc`, resolving each letter against the
/// catalog. A letter that takes an argument swallows the rest of the
/// cluster, or the next token when the cluster is exhausted.
fn parse_short(tokens: &mut Tokens, options: &mut Vec<Opt>) -> Result<Vec<Leaf>, String> {
    let token = tokens.pop();
    debug_assert!(token.starts_with('-') && !token.starts_with("--"));

    let cluster: Vec<char> = token.chars().skip(1).collect();
    let mut parsed = vec![];
    let mut i = 0;
    while i < cluster.len() {
        let short = format!("-{}", cluster[i]);
        i += 1;

        let similar: Vec<usize> = options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.short == short)
            .map(|(idx, _)| idx)
            .collect();
        if similar.len() > 1 {
            err!("'{}' is specified ambiguously {} times", short, similar.len())
        }

        if similar.is_empty() {
            options.push(Opt::new(&short, "", 0, Value::Switch(false)));
            let mut opt = options[options.len() - 1].clone();
            if tokens.is_parsing_argv() {
                opt.value = Value::Switch(true);
            }
            parsed.push(Leaf::Option(opt));
        } else {
            let mut opt = options[similar[0]].clone();
            let mut val: Option<String> = None;
            if opt.argcount > 0 {
                if i == cluster.len() {
                    let current = tokens.current();
                    if current.is_empty() || current == "--" {
                        err!("Flag '{}' requires an argument.", short)
                    }
                    val = Some(tokens.pop());
                } else {
                    val = Some(cluster[i..].iter().collect());
                    i = cluster.len();
                }
            }
            if tokens.is_parsing_argv() {
                opt.value = match val {
                    Some(v) => Value::Plain(v),
                    None => Value::Switch(true),
                };
            }
            parsed.push(Leaf::Option(opt));
        }
    }
    Ok(parsed)
}

/// Collects option descriptors from every `options:` section. A descriptor
/// starts at a line whose first non-space character is a hyphen and runs
/// until the next such line.
fn parse_defaults(doc: &str) -> Vec<Opt> {
    let mut defaults = vec![];
    for section in parse_section("options:", doc) {
        let body = after_colon(&section);
        let mut chunks: Vec<String> = vec![];
        for line in body.lines() {
            if line.trim_start().starts_with('-') {
                chunks.push(line.to_owned());
            } else if let Some(last) = chunks.last_mut() {
                last.push('\n');
                last.push_str(line);
            }
        }
        for chunk in &chunks {
            defaults.push(parse_desc(chunk));
        }
    }
    debug!("catalog from descriptions: {} options", defaults.len());
    defaults
}

/// Parses one option descriptor. The name part runs up to the first double
/// space; in it, `,` and `=` count as spaces, the last short and last long
/// flag win, and any other token means the option takes an argument. When
/// it does, the description is scanned for a `[default: ...]` tag.
fn parse_desc(desc: &str) -> Opt {
    let desc = desc.trim();
    let (names, description) = match desc.find("  ") {
        Some(i) => (&desc[..i], &desc[i..]),
        None => (desc, ""),
    };

    let normalized = names.replace([',', '='], " ");
    let (mut short, mut long) = ("", "");
    let mut argcount = 0;
    for tok in normalized.split_whitespace() {
        if tok.starts_with("--") {
            long = tok;
        } else if tok.starts_with('-') {
            short = tok;
        } else {
            argcount = 1;
        }
    }

    let mut value = Value::Switch(false);
    if argcount > 0 {
        if let Some(caps) = RE_DEFAULT.captures(description) {
            value = Value::Plain(caps[1].to_owned());
        }
    }
    Opt::new(short, long, argcount, value)
}

/// Parses argv into a flat list of leaves. Options become `Opt` leaves
/// carrying their values; everything else becomes an anonymous positional.
/// A lone `--` ends option parsing (and flows through as a positional, so
/// a declared `[--]` can match it); under `options_first` the first
/// positional ends it instead.
fn parse_argv_tokens(
    mut tokens: Tokens,
    options: &mut Vec<Opt>,
    options_first: bool,
) -> Result<Vec<Leaf>, String> {
    let mut parsed = vec![];
    while tokens.has_more() {
        let token = tokens.current().to_owned();
        if token == "--" {
            while tokens.has_more() {
                parsed.push(Leaf::argument("", Value::Plain(tokens.pop())));
            }
        } else if token.starts_with("--") {
            parsed.extend(parse_long(&mut tokens, options)?);
        } else if token.starts_with('-') && token != "-" {
            parsed.extend(parse_short(&mut tokens, options)?);
        } else if options_first {
            while tokens.has_more() {
                parsed.push(Leaf::argument("", Value::Plain(tokens.pop())));
            }
        } else {
            parsed.push(Leaf::argument("", Value::Plain(tokens.pop())));
        }
    }
    debug!("argv: {} pattern leaves", parsed.len());
    Ok(parsed)
}
