//! Rule string parse error types.

use std::fmt;

/// Result type for rule parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// An error that occurred while parsing a rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// Clause number where the error occurred (1-based), if it is tied to one.
    pub clause: Option<usize>,
    /// Additional context or message.
    pub message: String,
}

impl ParseError {
    /// Creates a new parse error.
    #[must_use]
    pub fn new(kind: ParseErrorKind, clause: Option<usize>, message: impl Into<String>) -> Self {
        Self {
            kind,
            clause,
            message: message.into(),
        }
    }

    /// Creates an invalid value error for a clause.
    #[must_use]
    pub fn invalid_value(clause: usize, key: &str, value: &str) -> Self {
        Self::new(
            ParseErrorKind::InvalidValue,
            Some(clause),
            format!("invalid {key} value: {value:?}"),
        )
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.clause {
            Some(clause) => write!(f, "clause {clause}: {}: {}", self.kind, self.message),
            None => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// The kind of parse error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input was empty or whitespace.
    Empty,
    /// A clause had no `=`.
    MalformedClause,
    /// The same key appeared twice.
    DuplicateKey,
    /// No `FREQ` clause.
    MissingFrequency,
    /// `FREQ` named a frequency outside the supported set.
    UnsupportedFrequency,
    /// A BYDAY token was not a weekday or used an unsupported ordinal.
    InvalidWeekday,
    /// Any other malformed value.
    InvalidValue,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty rule"),
            Self::MalformedClause => write!(f, "malformed clause"),
            Self::DuplicateKey => write!(f, "duplicate key"),
            Self::MissingFrequency => write!(f, "missing frequency"),
            Self::UnsupportedFrequency => write!(f, "unsupported frequency"),
            Self::InvalidWeekday => write!(f, "invalid weekday"),
            Self::InvalidValue => write!(f, "invalid value"),
        }
    }
}
