//! Recurrence engine for repeating tasks.
//!
//! - [`spec`]: the recurrence value attached to a task and its edit operations
//! - [`stored`]: the persisted JSON shape of a task's `recurrence` field
//! - [`normalize`]: reconciliation of stored recurrences into one canonical form
//! - [`schedule`]: next-occurrence computation under strict or fluid strategy
//! - [`task`]: completion of a stored task record

pub mod error;
pub mod normalize;
pub mod schedule;
pub mod spec;
pub mod stored;
pub mod task;

pub use mindwtr_core::types::RecurrenceStrategy;
pub use mindwtr_rrule::{
    ByDay, Frequency, Ordinal, OrdinalWeekday, RecurrenceRule, RecurrenceWeekday,
};
pub use normalize::{MonthlyPattern, classify_monthly_pattern, reconcile};
pub use schedule::{advance, next_occurrence, next_occurrence_date};
pub use spec::{Recurrence, RecurrenceSpec};
pub use stored::{StoredRecurrence, StoredRecurrenceObject};
pub use task::{CompletionOutcome, RecurringTask, TaskDate, TaskDocument, TimePrecision};
