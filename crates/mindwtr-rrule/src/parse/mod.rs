//! Rule string parsing.
//!
//! [`RecurrenceRule::try_parse`](crate::RecurrenceRule::try_parse) reports why a
//! string was rejected; [`parse`] degrades any failure to the empty rule.

mod error;
mod parser;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use parser::parse;
