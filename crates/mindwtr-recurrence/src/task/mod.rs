//! Completion of repeating tasks.
//!
//! Task records store their dates as ISO strings in one of three forms, and
//! each form is written back the way it was read.

mod document;

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use chrono_tz::Tz;

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::schedule::{next_occurrence, next_occurrence_date, resolve_local};
use crate::spec::Recurrence;

pub use document::TaskDocument;

const FLOATING_WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S%.f";
const FLOATING_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";
const FLOATING_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3f";
const FLOATING_MINUTES: &str = "%Y-%m-%dT%H:%M";
const DATE_ONLY: &str = "%Y-%m-%d";

/// How much of the time of day a floating date was stored with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePrecision {
    /// `09:00`
    Minutes,
    /// `09:00:00`
    Seconds,
    /// `09:00:00.000`
    Millis,
}

/// A stored task date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskDate {
    /// `2024-01-03`
    Date(NaiveDate),
    /// `2024-01-03T09:00`, `2024-01-03T09:00:00` or `2024-01-03T09:00:00.000`,
    /// read in the configured zone.
    Floating {
        at: NaiveDateTime,
        precision: TimePrecision,
    },
    /// `2024-01-03T09:00:00Z`, `2024-01-03T09:00:00.000Z`,
    /// `2024-01-03T09:00:00+02:00`
    Zoned {
        at: DateTime<FixedOffset>,
        with_millis: bool,
    },
}

impl TaskDate {
    /// ## Summary
    /// Parses a stored date string, remembering its form.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::InvalidDate` if the string is in none of the
    /// supported forms.
    pub fn parse(value: &str) -> RecurrenceResult<Self> {
        let value = value.trim();
        let fractional = value.contains('.');

        if let Ok(at) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::Zoned {
                at,
                with_millis: fractional,
            });
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(value, FLOATING_WITH_SECONDS) {
            let precision = if fractional {
                TimePrecision::Millis
            } else {
                TimePrecision::Seconds
            };
            return Ok(Self::Floating { at, precision });
        }
        if let Ok(at) = NaiveDateTime::parse_from_str(value, FLOATING_MINUTES) {
            return Ok(Self::Floating {
                at,
                precision: TimePrecision::Minutes,
            });
        }

        NaiveDate::parse_from_str(value, DATE_ONLY)
            .map(Self::Date)
            .map_err(|err| RecurrenceError::InvalidDate {
                value: value.to_string(),
                reason: err.to_string(),
            })
    }

    /// The calendar day this date falls on in `zone`.
    #[must_use]
    pub fn local_date(&self, zone: Tz) -> NaiveDate {
        match self {
            Self::Date(date) => *date,
            Self::Floating { at, .. } => at.date(),
            Self::Zoned { at, .. } => at.with_timezone(&zone).date_naive(),
        }
    }

    /// The instant this date stands for. Date-only values mean midnight in `zone`.
    #[must_use]
    pub fn instant(&self, zone: Tz) -> Option<DateTime<Utc>> {
        let local = match self {
            Self::Date(date) => date.and_hms_opt(0, 0, 0)?,
            Self::Floating { at, .. } => *at,
            Self::Zoned { at, .. } => return Some(at.with_timezone(&Utc)),
        };
        resolve_local(&zone, local).map(|at| at.with_timezone(&Utc))
    }

    /// ## Summary
    /// Moves the date by whole calendar days, keeping wall-clock time in
    /// `zone` and the stored form.
    ///
    /// Returns `None` on calendar overflow.
    #[must_use]
    pub fn shift_days(&self, days: i64, zone: Tz) -> Option<Self> {
        let delta = TimeDelta::try_days(days)?;
        match self {
            Self::Date(date) => date.checked_add_signed(delta).map(Self::Date),
            Self::Floating { at, precision } => {
                at.checked_add_signed(delta).map(|at| Self::Floating {
                    at,
                    precision: *precision,
                })
            }
            Self::Zoned { at, with_millis } => {
                let local = at.with_timezone(&zone).naive_local().checked_add_signed(delta)?;
                resolve_local(&zone, local).map(|moved| Self::Zoned {
                    at: moved.with_timezone(&at.timezone()),
                    with_millis: *with_millis,
                })
            }
        }
    }

    /// Next occurrence of this date under `recurrence`, in the same form.
    fn next(
        &self,
        recurrence: &Recurrence,
        completed_at: DateTime<Utc>,
        zone: Tz,
    ) -> Option<Self> {
        match self {
            Self::Date(date) => {
                let completed_on = completed_at.with_timezone(&zone).date_naive();
                next_occurrence_date(*date, recurrence, completed_on).map(Self::Date)
            }
            Self::Floating { at, precision } => {
                let anchor = resolve_local(&zone, *at)?;
                next_occurrence(&anchor, recurrence, &completed_at).map(|next| Self::Floating {
                    at: next.naive_local(),
                    precision: *precision,
                })
            }
            Self::Zoned { at, with_millis } => {
                let anchor = at.with_timezone(&zone);
                next_occurrence(&anchor, recurrence, &completed_at).map(|next| Self::Zoned {
                    at: next.with_timezone(&at.timezone()),
                    with_millis: *with_millis,
                })
            }
        }
    }
}

impl fmt::Display for TaskDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_ONLY)),
            Self::Floating { at, precision } => {
                let format = match precision {
                    TimePrecision::Minutes => FLOATING_MINUTES,
                    TimePrecision::Seconds => FLOATING_SECONDS,
                    TimePrecision::Millis => FLOATING_MILLIS,
                };
                write!(f, "{}", at.format(format))
            }
            Self::Zoned { at, with_millis } => {
                let use_z = at.offset().local_minus_utc() == 0;
                let seconds = if *with_millis {
                    SecondsFormat::Millis
                } else {
                    SecondsFormat::Secs
                };
                f.write_str(&at.to_rfc3339_opts(seconds, use_z))
            }
        }
    }
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The task does not repeat; it is simply done.
    NotRecurring,
    /// The task moves to its next occurrence.
    Rescheduled {
        start_time: Option<TaskDate>,
        due_date: Option<TaskDate>,
    },
    /// The task repeats but no next occurrence exists.
    RecurrenceEnded,
}

/// The scheduling-relevant part of a task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurringTask {
    pub start_time: Option<TaskDate>,
    pub due_date: Option<TaskDate>,
    pub recurrence: Recurrence,
}

impl RecurringTask {
    /// ## Summary
    /// Completes the task at `completed_at`.
    ///
    /// The due date is the anchor when present, else the start time. The
    /// anchor moves to its next occurrence and the other date moves by the
    /// same number of calendar days. A task with neither date gets a date-only
    /// due date computed from the completion day.
    #[must_use]
    pub fn complete(&self, completed_at: DateTime<Utc>, zone: Tz) -> CompletionOutcome {
        if !self.recurrence.is_recurring() {
            return CompletionOutcome::NotRecurring;
        }

        let outcome = match (self.due_date, self.start_time) {
            (Some(due), start) => self.reschedule(due, start, completed_at, zone).map(
                |(due_date, start_time)| CompletionOutcome::Rescheduled {
                    start_time,
                    due_date: Some(due_date),
                },
            ),
            (None, Some(start)) => self.reschedule(start, None, completed_at, zone).map(
                |(start_time, _)| CompletionOutcome::Rescheduled {
                    start_time: Some(start_time),
                    due_date: None,
                },
            ),
            (None, None) => {
                let today = completed_at.with_timezone(&zone).date_naive();
                next_occurrence_date(today, &self.recurrence, today).map(|next| {
                    CompletionOutcome::Rescheduled {
                        start_time: None,
                        due_date: Some(TaskDate::Date(next)),
                    }
                })
            }
        };

        outcome.unwrap_or_else(|| {
            tracing::warn!(
                rrule = self.recurrence.spec().map(crate::spec::RecurrenceSpec::rrule),
                %completed_at,
                "Recurring task has no next occurrence, ending recurrence"
            );
            CompletionOutcome::RecurrenceEnded
        })
    }

    /// Moves `anchor` to its next occurrence and `follower` by the same days.
    fn reschedule(
        &self,
        anchor: TaskDate,
        follower: Option<TaskDate>,
        completed_at: DateTime<Utc>,
        zone: Tz,
    ) -> Option<(TaskDate, Option<TaskDate>)> {
        let next = anchor.next(&self.recurrence, completed_at, zone)?;
        let days = next
            .local_date(zone)
            .signed_duration_since(anchor.local_date(zone))
            .num_days();

        let follower = match follower {
            Some(date) => Some(date.shift_days(days, zone)?),
            None => None,
        };

        tracing::debug!(from = %anchor, to = %next, days, "Rescheduled recurring task");
        Some((next, follower))
    }
}
