use core::fmt;

use serde::Serialize;
use thiserror::Error;

/// The kind of data a tag holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Invalid,
    String,
    Integer,
    Boolean,
}
impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("invalid"),
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Boolean => f.write_str("boolean"),
        }
    }
}

/// A single tag value.
///
/// `Invalid` is both the result of a failed conversion and, inside a batch of
/// edits, the instruction to delete a tag. Which one is meant depends on
/// where the value came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaggedValue {
    #[default]
    Invalid,
    Boolean(bool),
    Integer(i64),
    String(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("Invalid integer value: {0}")]
    NotAnInteger(String),
    #[error("Integer string out of range: {0}")]
    OutOfRange(String),
    #[error("Invalid boolean value: {0}")]
    NotABoolean(String),
    #[error("Values of kind {0} cannot be parsed")]
    UnparsableKind(ValueKind),
}

#[track_caller]
fn bad_accessor(wanted: ValueKind, got: ValueKind) -> ! {
    panic!("bad accessor: requested {wanted} from a {got} value")
}

/// Reads an optional sign and the digits after leading whitespace, ignoring
/// whatever follows them, so `"7/12"` is 7 and `"2019-05-01"` is 2019.
/// Values must fit in 32 bits.
fn leading_integer(text: &str) -> Result<i64, ValueError> {
    let trimmed = text.trim_start();
    let unsigned = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let digits = unsigned.len()
        - unsigned
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .len();
    if digits == 0 {
        return Err(ValueError::NotAnInteger(text.to_owned()));
    }
    let end = trimmed.len() - unsigned.len() + digits;
    trimmed[..end]
        .parse::<i32>()
        .map(i64::from)
        .map_err(|_| ValueError::OutOfRange(text.to_owned()))
}

impl TaggedValue {
    pub fn value_type(&self) -> ValueKind {
        match self {
            Self::Invalid => ValueKind::Invalid,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Integer(_) => ValueKind::Integer,
            Self::String(_) => ValueKind::String,
        }
    }
    pub fn is_invalid(&self) -> bool {
        matches!(self, Self::Invalid)
    }

    /// # Panics
    /// If the value is not an integer.
    #[track_caller]
    pub fn get_int(&self) -> i64 {
        match self {
            Self::Integer(i) => *i,
            other => bad_accessor(ValueKind::Integer, other.value_type()),
        }
    }
    /// # Panics
    /// If the value is not a boolean.
    #[track_caller]
    pub fn get_bool(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            other => bad_accessor(ValueKind::Boolean, other.value_type()),
        }
    }
    /// # Panics
    /// If the value is not a string.
    #[track_caller]
    pub fn get_str(&self) -> &str {
        match self {
            Self::String(s) => s,
            other => bad_accessor(ValueKind::String, other.value_type()),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn set_int(&mut self, value: i64) {
        *self = Self::Integer(value);
    }
    pub fn set_bool(&mut self, value: bool) {
        *self = Self::Boolean(value);
    }
    pub fn set_str(&mut self, value: impl Into<String>) {
        *self = Self::String(value.into());
    }
    pub fn set_invalid(&mut self) {
        *self = Self::Invalid;
    }

    /// Converts user input to `kind`, yielding `Invalid` when that fails.
    pub fn parse(kind: ValueKind, text: &str) -> Self {
        Self::parse_strict(kind, text).unwrap_or_default()
    }

    pub fn parse_strict(kind: ValueKind, text: &str) -> Result<Self, ValueError> {
        match kind {
            ValueKind::String => Ok(Self::String(text.to_owned())),
            ValueKind::Integer => leading_integer(text).map(Self::Integer),
            ValueKind::Boolean => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Self::Boolean(true)),
                "false" | "no" | "0" => Ok(Self::Boolean(false)),
                _ => Err(ValueError::NotABoolean(text.to_owned())),
            },
            ValueKind::Invalid => Err(ValueError::UnparsableKind(kind)),
        }
    }
}

impl From<bool> for TaggedValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}
impl From<i64> for TaggedValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}
impl From<String> for TaggedValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
impl From<&str> for TaggedValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl fmt::Display for TaggedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("<INVALID DATA>"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

impl Serialize for TaggedValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Invalid => serializer.serialize_unit(),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::Integer(i) => serializer.serialize_i64(*i),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}
