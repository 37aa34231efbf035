//! Recurrence rule vocabulary and the canonical rule string codec.
//!
//! The canonical form is a constrained subset of the RFC 5545 RRULE grammar:
//! `FREQ=<freq>[;INTERVAL=<n>][;BYDAY=<tok>,...][;BYMONTHDAY=<d>,...]`.
//!
//! - [`build`] and [`RecurrenceRule`]'s `Display` produce the canonical string.
//! - [`parse`] never fails: anything it cannot read becomes the empty rule.
//! - [`RecurrenceRule::try_parse`] is the strict variant for callers that need
//!   to know why a string was rejected.

pub mod build;
pub mod error;
pub mod parse;
pub mod vocab;


pub use build::{build, serialize};
pub use vocab::{ByDay, Frequency, Ordinal, OrdinalWeekday, RecurrenceRule, RecurrenceWeekday};
pub use parse::parse;
