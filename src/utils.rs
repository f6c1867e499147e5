//! Utilities that needed a home.

/// A regex compiled on first use, so it can live in a `static`.
pub struct LazyRegex {
    source: &'static str,
    compiled: ::once_cell::sync::OnceCell<::regex::Regex>,
}

impl LazyRegex {
    /// Creates a new const instance holding the given pattern.
    pub const fn new(source: &'static str) -> LazyRegex {
        LazyRegex {
            source,
            compiled: ::once_cell::sync::OnceCell::new(),
        }
    }
}

impl ::std::ops::Deref for LazyRegex {
    type Target = ::regex::Regex;

    fn deref(&self) -> &::regex::Regex {
        self.compiled
            .get_or_init(|| ::regex::Regex::new(self.source).unwrap())
    }
}

/// Declares lazily compiled regex statics.
macro_rules! decl_regex {
    ($($name:ident: $re:literal;)*) => {
        $(
            static $name: $crate::utils::LazyRegex =
                $crate::utils::LazyRegex::new($re);
        )*
    };
}

/// Print an error to stderr.
macro_rules! werr {
    ($($arg:tt)*) => ({
        use std::io::{Write, stderr};
        write!(&mut stderr(), $($arg)*).unwrap();
    });
}
