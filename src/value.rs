//! The value type produced by matching argv against a usage pattern.

use std::error::Error as StdError;
use std::fmt;

/// The kind of data a `Value` holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Empty,
    Switch,
    Counted,
    Plain,
    List,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Kind::Empty => "empty",
            Kind::Switch => "switch",
            Kind::Counted => "counted",
            Kind::Plain => "plain",
            Kind::List => "list",
        };
        write!(f, "{}", name)
    }
}

/// A matched command line value.
///
/// The value can be a boolean switch, a counted repetition, a plain string
/// or a list of strings. `Empty` marks an argument that was never captured,
/// which is distinct from a flag that was given without its argument.
///
/// The `as_*` accessors are strict: asking for the wrong kind is a
/// `CastError`, never a silent coercion.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// Nothing captured. Rendered as `null`.
    Empty,

    /// A boolean from a flag or command that takes no argument.
    Switch(bool),

    /// The number of occurrences of a repeatable flag or command.
    Counted(i64),

    /// A single string captured by a positional or flag argument.
    Plain(String),

    /// The strings captured by a repeatable positional or flag argument.
    List(Vec<String>),
}

/// The error produced by the strict `Value` accessors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CastError {
    /// The value does not hold the requested kind.
    IllegalCast { expected: Kind, actual: Kind },

    /// A plain string could not be read as a base 10 integer.
    NonNumeric(String),
}

impl fmt::Display for CastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastError::IllegalCast { expected, actual } => {
                write!(f, "Illegal cast to {}; value is actually {}.", expected, actual)
            }
            CastError::NonNumeric(s) => {
                write!(f, "'{}' contains non-numeric characters.", s)
            }
        }
    }
}

impl StdError for CastError {}

impl Value {
    pub fn kind(&self) -> Kind {
        match *self {
            Value::Empty => Kind::Empty,
            Value::Switch(..) => Kind::Switch,
            Value::Counted(..) => Kind::Counted,
            Value::Plain(..) => Kind::Plain,
            Value::List(..) => Kind::List,
        }
    }

    /// True unless the value is `Empty`.
    pub fn has_value(&self) -> bool {
        !matches!(*self, Value::Empty)
    }

    /// Returns the boolean of a `Switch` value.
    pub fn as_switch(&self) -> Result<bool, CastError> {
        match *self {
            Value::Switch(b) => Ok(b),
            ref v => Err(v.illegal_cast(Kind::Switch)),
        }
    }

    /// Returns the count of a `Counted` value.
    ///
    /// A `Plain` value is accepted as well and parsed as a base 10 signed
    /// integer; anything short of a fully numeric string is `NonNumeric`.
    pub fn as_count(&self) -> Result<i64, CastError> {
        match *self {
            Value::Counted(n) => Ok(n),
            Value::Plain(ref s) => {
                s.parse().map_err(|_| CastError::NonNumeric(s.clone()))
            }
            ref v => Err(v.illegal_cast(Kind::Counted)),
        }
    }

    /// Returns the string of a `Plain` value.
    pub fn as_str(&self) -> Result<&str, CastError> {
        match *self {
            Value::Plain(ref s) => Ok(s),
            ref v => Err(v.illegal_cast(Kind::Plain)),
        }
    }

    /// Returns the strings of a `List` value.
    pub fn as_list(&self) -> Result<&[String], CastError> {
        match *self {
            Value::List(ref vs) => Ok(vs),
            ref v => Err(v.illegal_cast(Kind::List)),
        }
    }

    fn illegal_cast(&self, expected: Kind) -> CastError {
        CastError::IllegalCast { expected, actual: self.kind() }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Value::Empty => write!(f, "null"),
            Value::Switch(b) => write!(f, "{}", b),
            Value::Counted(n) => write!(f, "{}", n),
            Value::Plain(ref s) => write!(f, "\"{}\"", s),
            Value::List(ref vs) => {
                write!(f, "[")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{}\"", v)?;
                }
                write!(f, "]")
            }
        }
    }
}
