//! The pattern tree derived from a usage string: leaves and branches, the
//! normalization passes and the backtracking matcher.
//!
//! Branch nodes own their children as plain values. Leaves live in an arena
//! and are referenced by index, so that two occurrences of the same flag or
//! argument can be collapsed onto one slot and re-typed in one place when
//! repetition promotes them to a counter or a list.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::debug;

use crate::value::Value;

/// Index of a leaf in a tree's arena.
pub type LeafId = usize;

pub type PatternList = Vec<Pattern>;

/// A node of the derived grammar tree.
#[derive(Clone, Debug)]
pub enum Pattern {
    /// All children must match, in declaration order.
    Required(PatternList),

    /// Children match independently; never fails.
    Optional(PatternList),

    /// The `[options]` placeholder. Filled during shortcut resolution with
    /// every described option not named in the usage line; matches like
    /// `Optional`.
    OptionsShortcut(PatternList),

    /// The child repeated one or more times.
    OneOrMore(Box<Pattern>),

    /// Exactly one alternative matches. The alternative leaving the fewest
    /// argv tokens unconsumed wins; ties go to the earliest declared.
    Either(PatternList),

    Leaf(LeafId),
}

/// An option as described in an options section or discovered while
/// parsing the usage line or argv. Short and long forms keep their leading
/// hyphens; `argcount` is 0 or 1.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Opt {
    pub short: String,
    pub long: String,
    pub argcount: usize,
    pub value: Value,
}

impl Opt {
    pub fn new(short: &str, long: &str, argcount: usize, value: Value) -> Opt {
        // An option that takes an argument distinguishes "never given" from
        // "given without a value", so a false default becomes Empty.
        let value = if argcount > 0 && value == Value::Switch(false) {
            Value::Empty
        } else {
            value
        };
        Opt { short: short.to_owned(), long: long.to_owned(), argcount, value }
    }

    /// The result-map key: the long form when present, else the short.
    pub fn name(&self) -> &str {
        if self.long.is_empty() { &self.short } else { &self.long }
    }
}

/// A leaf of the pattern tree. Parsed argv tokens take the same shape:
/// options carry their parsed values and positionals are anonymous
/// `Argument`s.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Leaf {
    /// A literal subcommand word; true once matched.
    Command { name: String, value: Value },

    /// A positional argument, `<bracketed>` or `UPPER` in the usage line.
    Argument { name: String, value: Value },

    Option(Opt),
}

impl Leaf {
    pub fn command(name: &str) -> Leaf {
        Leaf::Command { name: name.to_owned(), value: Value::Switch(false) }
    }

    pub fn argument(name: &str, value: Value) -> Leaf {
        Leaf::Argument { name: name.to_owned(), value }
    }

    pub fn name(&self) -> &str {
        match *self {
            Leaf::Command { ref name, .. } => name,
            Leaf::Argument { ref name, .. } => name,
            Leaf::Option(ref opt) => opt.name(),
        }
    }

    pub fn value(&self) -> &Value {
        match *self {
            Leaf::Command { ref value, .. } => value,
            Leaf::Argument { ref value, .. } => value,
            Leaf::Option(ref opt) => &opt.value,
        }
    }

    pub fn set_value(&mut self, new: Value) {
        match *self {
            Leaf::Command { ref mut value, .. } => *value = new,
            Leaf::Argument { ref mut value, .. } => *value = new,
            Leaf::Option(ref mut opt) => opt.value = new,
        }
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            // Anonymous argv positionals display as their captured token.
            Leaf::Argument { ref name, ref value } => match *value {
                Value::Plain(ref s) if name.is_empty() => write!(f, "{}", s),
                _ => write!(f, "{}", name),
            },
            _ => write!(f, "{}", self.name()),
        }
    }
}

/// The pattern tree for one doc string: a root branch plus the arena its
/// leaves live in.
#[derive(Clone, Debug)]
pub struct PatternTree {
    root: Pattern,
    leaves: Vec<Leaf>,
}

impl PatternTree {
    pub fn new(root: Pattern, leaves: Vec<Leaf>) -> PatternTree {
        PatternTree { root, leaves }
    }

    /// Every leaf reachable from the root, in declaration order, once per
    /// occurrence.
    pub fn tree_leaves(&self) -> Vec<&Leaf> {
        let mut ids = vec![];
        collect_leaf_ids(&self.root, &mut ids);
        ids.into_iter().map(|id| &self.leaves[id]).collect()
    }

    /// Fills every `[options]` placeholder with the described options that
    /// the usage line does not name. Must run before `fix` so the installed
    /// copies unify with their duplicates elsewhere in the tree.
    pub fn resolve_options_shortcut(&mut self, descs: &[Opt]) {
        let named: HashSet<&Opt> = self
            .leaves
            .iter()
            .filter_map(|leaf| match leaf {
                Leaf::Option(opt) => Some(opt),
                _ => None,
            })
            .collect();
        let missing: Vec<Opt> = descs
            .iter()
            .filter(|opt| !named.contains(opt))
            .cloned()
            .collect();
        install_shortcut(&mut self.root, &missing, &mut self.leaves);
    }

    /// The normalization pass: canonicalize leaf identity, then promote
    /// leaves that can repeat to their accumulator type.
    pub fn fix(&mut self) {
        self.fix_identities();
        self.fix_repeating_arguments();
    }

    /// Collapses structurally equal leaves onto a single arena slot, so a
    /// later mutation through one occurrence is seen by all of them.
    /// Identity is full structural equality, with the hash only fronting
    /// the table.
    fn fix_identities(&mut self) {
        let mut seen: HashMap<Leaf, LeafId> = HashMap::new();
        canonicalize(&mut self.root, &self.leaves, &mut seen);
    }

    /// Detects leaves that can be consumed more than once within a single
    /// alternative and re-types their value: commands and no-argument
    /// options count, positionals and argument-taking options accumulate
    /// into lists. A scalar string default is split on whitespace when it
    /// becomes a list.
    fn fix_repeating_arguments(&mut self) {
        let children = match self.root {
            Pattern::Required(ref cs) => cs.clone(),
            ref other => vec![other.clone()],
        };
        for group in transform(children) {
            let mut counts: HashMap<LeafId, usize> = HashMap::new();
            for pat in &group {
                if let Pattern::Leaf(id) = pat {
                    *counts.entry(*id).or_insert(0) += 1;
                }
            }
            for (&id, &n) in &counts {
                if n > 1 {
                    promote(&mut self.leaves[id]);
                }
            }
        }
    }

    /// Matches parsed argv leaves against the root pattern. Returns whether
    /// the root matched, the unconsumed argv leaves and the collected
    /// result leaves.
    pub fn matches(&self, argv: &[Leaf]) -> (bool, Vec<Leaf>, Vec<Leaf>) {
        let mut left: Vec<Leaf> = argv.to_vec();
        let mut collected: Vec<Leaf> = vec![];
        let matched = self.matches_pattern(&self.root, &mut left, &mut collected);
        debug!("match: ok={} leftover={}", matched, left.len());
        (matched, left, collected)
    }

    /// `left` and `collected` are transactional: on failure they are left
    /// exactly as they were.
    fn matches_pattern(
        &self,
        pat: &Pattern,
        left: &mut Vec<Leaf>,
        collected: &mut Vec<Leaf>,
    ) -> bool {
        match pat {
            Pattern::Required(children) => {
                let mut l = left.clone();
                let mut c = collected.clone();
                for child in children {
                    if !self.matches_pattern(child, &mut l, &mut c) {
                        return false;
                    }
                }
                *left = l;
                *collected = c;
                true
            }
            Pattern::Optional(children) | Pattern::OptionsShortcut(children) => {
                for child in children {
                    self.matches_pattern(child, left, collected);
                }
                true
            }
            Pattern::OneOrMore(child) => {
                let mut l = left.clone();
                let mut c = collected.clone();
                let mut times = 0;
                let mut prev: Option<Vec<Leaf>> = None;
                loop {
                    if !self.matches_pattern(child, &mut l, &mut c) {
                        break;
                    }
                    times += 1;
                    // A match that consumed nothing is a fixed point.
                    if prev.as_ref() == Some(&l) {
                        break;
                    }
                    prev = Some(l.clone());
                }
                if times == 0 {
                    return false;
                }
                *left = l;
                *collected = c;
                true
            }
            Pattern::Either(children) => {
                let mut best: Option<(Vec<Leaf>, Vec<Leaf>)> = None;
                for child in children {
                    let mut l = left.clone();
                    let mut c = collected.clone();
                    if self.matches_pattern(child, &mut l, &mut c)
                        && best.as_ref().map_or(true, |(bl, _)| l.len() < bl.len())
                    {
                        best = Some((l, c));
                    }
                }
                match best {
                    Some((l, c)) => {
                        *left = l;
                        *collected = c;
                        true
                    }
                    None => false,
                }
            }
            Pattern::Leaf(id) => self.matches_leaf(*id, left, collected),
        }
    }

    fn matches_leaf(&self, id: LeafId, left: &mut Vec<Leaf>, collected: &mut Vec<Leaf>) -> bool {
        let leaf = &self.leaves[id];
        let (idx, hit) = match single_match(leaf, left) {
            None => return false,
            Some(found) => found,
        };
        left.remove(idx);

        let existing = collected.iter().position(|c| c.name() == leaf.name());
        match *leaf.value() {
            // The leaf was promoted to a counter.
            Value::Counted(_) => match existing {
                None => {
                    let mut hit = hit;
                    hit.set_value(Value::Counted(1));
                    collected.push(hit);
                }
                Some(i) => {
                    let n = match *collected[i].value() {
                        Value::Counted(n) => n + 1,
                        _ => 1,
                    };
                    collected[i].set_value(Value::Counted(n));
                }
            },
            // The leaf was promoted to a list; earlier hits come first.
            Value::List(_) => {
                let items = match *hit.value() {
                    Value::Plain(ref s) => vec![s.clone()],
                    Value::List(ref vs) => vs.clone(),
                    _ => vec![],
                };
                match existing {
                    None => {
                        let mut hit = hit;
                        hit.set_value(Value::List(items));
                        collected.push(hit);
                    }
                    Some(i) => {
                        let merged = match *collected[i].value() {
                            Value::List(ref vs) => {
                                let mut merged = vs.clone();
                                merged.extend(items);
                                merged
                            }
                            _ => items,
                        };
                        collected[i].set_value(Value::List(merged));
                    }
                }
            }
            _ => collected.push(hit),
        }
        true
    }
}

/// Finds what in `left` this leaf consumes: the index of the argv leaf and
/// the collected leaf to record for it.
fn single_match(leaf: &Leaf, left: &[Leaf]) -> Option<(usize, Leaf)> {
    match *leaf {
        Leaf::Argument { ref name, .. } => {
            for (i, candidate) in left.iter().enumerate() {
                if let Leaf::Argument { ref value, .. } = *candidate {
                    return Some((i, Leaf::argument(name, value.clone())));
                }
            }
            None
        }
        Leaf::Command { ref name, .. } => {
            // Only the first positional in `left` is eligible.
            for (i, candidate) in left.iter().enumerate() {
                if let Leaf::Argument { ref value, .. } = *candidate {
                    if matches!(*value, Value::Plain(ref s) if s == name) {
                        return Some((i, Leaf::Command {
                            name: name.clone(),
                            value: Value::Switch(true),
                        }));
                    }
                    return None;
                }
            }
            None
        }
        Leaf::Option(ref opt) => left
            .iter()
            .position(|c| matches!(c, Leaf::Option(o) if o.name() == opt.name()))
            .map(|i| (i, left[i].clone())),
    }
}

fn canonicalize(pat: &mut Pattern, leaves: &[Leaf], seen: &mut HashMap<Leaf, LeafId>) {
    match pat {
        Pattern::Required(cs)
        | Pattern::Optional(cs)
        | Pattern::OptionsShortcut(cs)
        | Pattern::Either(cs) => {
            for c in cs {
                canonicalize(c, leaves, seen);
            }
        }
        Pattern::OneOrMore(c) => canonicalize(c, leaves, seen),
        Pattern::Leaf(id) => {
            let canonical = *seen.entry(leaves[*id].clone()).or_insert(*id);
            *id = canonical;
        }
    }
}

fn install_shortcut(pat: &mut Pattern, missing: &[Opt], leaves: &mut Vec<Leaf>) {
    match pat {
        Pattern::Required(cs) | Pattern::Optional(cs) | Pattern::Either(cs) => {
            for c in cs {
                install_shortcut(c, missing, leaves);
            }
        }
        Pattern::OneOrMore(c) => install_shortcut(c, missing, leaves),
        Pattern::OptionsShortcut(cs) => {
            for opt in missing {
                leaves.push(Leaf::Option(opt.clone()));
                cs.push(Pattern::Leaf(leaves.len() - 1));
            }
        }
        Pattern::Leaf(_) => {}
    }
}

fn collect_leaf_ids(pat: &Pattern, ids: &mut Vec<LeafId>) {
    match pat {
        Pattern::Required(cs)
        | Pattern::Optional(cs)
        | Pattern::OptionsShortcut(cs)
        | Pattern::Either(cs) => {
            for c in cs {
                collect_leaf_ids(c, ids);
            }
        }
        Pattern::OneOrMore(c) => collect_leaf_ids(c, ids),
        Pattern::Leaf(id) => ids.push(*id),
    }
}

/// Expands a pattern list into its flat alternatives: one list of leaves
/// per way the branches can unfold. A `OneOrMore` child is laid out twice
/// so that the duplicate count downstream sees the "two or more" case.
fn transform(pattern: PatternList) -> Vec<PatternList> {
    let mut result = vec![];
    let mut groups = vec![pattern];
    while !groups.is_empty() {
        let mut children = groups.remove(0);
        let branch = children
            .iter()
            .position(|p| !matches!(p, Pattern::Leaf(_)));
        let i = match branch {
            None => {
                // Leaves only: this alternative is fully expanded.
                result.push(children);
                continue;
            }
            Some(i) => i,
        };
        let child = children.remove(i);
        match child {
            Pattern::Either(alts) => {
                for alt in alts {
                    let mut group = vec![alt];
                    group.extend(children.iter().cloned());
                    groups.push(group);
                }
            }
            Pattern::OneOrMore(inner) => {
                let mut group = vec![(*inner).clone(), *inner];
                group.extend(children.iter().cloned());
                groups.push(group);
            }
            Pattern::Required(cs) | Pattern::Optional(cs) | Pattern::OptionsShortcut(cs) => {
                let mut group = cs;
                group.extend(children.iter().cloned());
                groups.push(group);
            }
            Pattern::Leaf(_) => unreachable!("position() only selects branches"),
        }
    }
    result
}

fn promote(leaf: &mut Leaf) {
    let to_list = match leaf {
        Leaf::Command { .. } => false,
        Leaf::Argument { .. } => true,
        Leaf::Option(opt) => opt.argcount > 0,
    };
    if to_list {
        let new = match *leaf.value() {
            Value::Plain(ref s) => {
                Value::List(s.split_whitespace().map(String::from).collect())
            }
            Value::List(ref vs) => Value::List(vs.clone()),
            _ => Value::List(vec![]),
        };
        leaf.set_value(new);
    } else {
        leaf.set_value(Value::Counted(0));
    }
}
