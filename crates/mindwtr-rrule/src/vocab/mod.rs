//! Recurrence rule vocabulary.
//!
//! These are the closed enumerations every other layer builds on: weekdays,
//! the ordinals allowed in monthly patterns, BYDAY tokens, base frequencies,
//! and the decoded rule itself.

mod by_day;
mod frequency;
mod rule;
mod weekday;

pub use by_day::{ByDay, Ordinal, OrdinalWeekday};
pub use frequency::Frequency;
pub use rule::RecurrenceRule;
pub use weekday::RecurrenceWeekday;
