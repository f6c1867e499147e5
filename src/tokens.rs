//! A cursor over string tokens, shared by the usage parser and the argv
//! parser. The two differ only in how the stream was produced and in the
//! `is_parsing_argv` flag, which relaxes option lookup to prefix matching
//! and makes parsed options carry their argv values.

decl_regex! {
    // Brackets, parens, pipes and the ellipsis are strong delimiters: they
    // end a token wherever they appear.
    RE_DELIMITERS: r"\.\.\.|\[|\]|\(|\)|\|";
    // Words between delimiters. `<...>` strings may contain spaces and are
    // kept whole, together with anything glued in front of them.
    RE_WORDS: r"\S*<[^>]*>|[^<>\s]+";
}

/// An ordered stream of tokens with a cursor.
#[derive(Clone, Debug)]
pub struct Tokens {
    toks: Vec<String>,
    pos: usize,
    parsing_argv: bool,
}

impl Tokens {
    /// A stream over user argv. Tokens are taken verbatim.
    pub fn from_argv(argv: Vec<String>) -> Tokens {
        Tokens { toks: argv, pos: 0, parsing_argv: true }
    }

    /// Tokenizes a usage pattern in two stages: first split out the strong
    /// delimiters, then extract the words between them.
    pub fn from_pattern(source: &str) -> Tokens {
        let mut toks = vec![];
        let mut last = 0;
        for m in RE_DELIMITERS.find_iter(source) {
            push_words(&mut toks, &source[last..m.start()]);
            toks.push(m.as_str().to_owned());
            last = m.end();
        }
        push_words(&mut toks, &source[last..]);
        Tokens { toks, pos: 0, parsing_argv: false }
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.toks.len()
    }

    /// The token under the cursor, or `""` when the stream is exhausted.
    pub fn current(&self) -> &str {
        self.toks.get(self.pos).map_or("", |s| s.as_str())
    }

    /// Advances past the current token and returns it, or `""` at the end.
    pub fn pop(&mut self) -> String {
        match self.toks.get(self.pos) {
            None => String::new(),
            Some(tok) => {
                self.pos += 1;
                tok.clone()
            }
        }
    }

    /// The unconsumed tokens joined with spaces.
    pub fn the_rest(&self) -> String {
        self.toks[self.pos..].join(" ")
    }

    pub fn is_parsing_argv(&self) -> bool {
        self.parsing_argv
    }
}

fn push_words(toks: &mut Vec<String>, chunk: &str) {
    for m in RE_WORDS.find_iter(chunk) {
        toks.push(m.as_str().to_owned());
    }
}
