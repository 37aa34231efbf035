//! Decoded recurrence rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ByDay, Frequency, RecurrenceWeekday};
use crate::error::{RuleError, RuleResult};

/// A recurrence rule in the supported RRULE subset.
///
/// This is the stateless result of a single parse. A rule with no
/// `frequency` is the "no recurrence" shape that malformed input degrades to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceRule {
    /// Base frequency; `None` means no recurrence.
    pub frequency: Option<Frequency>,

    /// Repeat interval, at least 1.
    pub interval: u32,

    /// By-day list, order preserved.
    pub by_day: Vec<ByDay>,

    /// By-monthday list (1-31).
    pub by_month_day: Vec<u8>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::empty()
    }
}

impl RecurrenceRule {
    /// The "no recurrence" rule.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            frequency: None,
            interval: 1,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
        }
    }

    /// Creates a rule with the given frequency and no other parts.
    #[must_use]
    pub const fn new(frequency: Frequency) -> Self {
        Self {
            frequency: Some(frequency),
            interval: 1,
            by_day: Vec::new(),
            by_month_day: Vec::new(),
        }
    }

    /// Creates a daily recurrence rule.
    #[must_use]
    pub const fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    /// Creates a weekly recurrence rule.
    #[must_use]
    pub const fn weekly() -> Self {
        Self::new(Frequency::Weekly)
    }

    /// Creates a monthly recurrence rule.
    #[must_use]
    pub const fn monthly() -> Self {
        Self::new(Frequency::Monthly)
    }

    /// Creates a yearly recurrence rule.
    #[must_use]
    pub const fn yearly() -> Self {
        Self::new(Frequency::Yearly)
    }

    /// Sets the interval.
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<ByDay>) -> Self {
        self.by_day = days;
        self
    }

    /// Sets the by-monthday list.
    #[must_use]
    pub fn with_by_month_day(mut self, days: Vec<u8>) -> Self {
        self.by_month_day = days;
        self
    }

    /// Returns `true` for the "no recurrence" shape.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.frequency.is_none()
    }

    /// Returns `true` if any BYDAY token carries an ordinal.
    #[must_use]
    pub fn has_ordinal(&self) -> bool {
        self.by_day.iter().any(|day| day.is_ordinal())
    }

    /// Returns the weekdays named by the BYDAY list, ignoring ordinals.
    #[must_use]
    pub fn weekdays(&self) -> Vec<RecurrenceWeekday> {
        self.by_day.iter().map(|day| day.weekday()).collect()
    }

    /// ## Summary
    /// Checks that the rule is one of the shapes the product supports.
    ///
    /// - a frequency is present and the interval is at least 1
    /// - bare weekday tokens only appear in weekly rules
    /// - ordinal tokens and BYMONTHDAY only appear in monthly rules, and not together
    /// - BYMONTHDAY values are within 1-31
    ///
    /// ## Errors
    /// Returns `RuleError::ValidationError` describing the first violation found.
    pub fn validate(&self) -> RuleResult<()> {
        let Some(frequency) = self.frequency else {
            return Err(invalid("rule has no frequency"));
        };

        if self.interval == 0 {
            return Err(invalid("interval must be at least 1"));
        }

        if let Some(day) = self.by_day.iter().find(|day| !day.is_ordinal())
            && frequency != Frequency::Weekly
        {
            return Err(invalid(format!(
                "weekday {day} is only valid for weekly rules, not {frequency}"
            )));
        }

        if let Some(day) = self.by_day.iter().find(|day| day.is_ordinal())
            && frequency != Frequency::Monthly
        {
            return Err(invalid(format!(
                "ordinal weekday {day} is only valid for monthly rules, not {frequency}"
            )));
        }

        if !self.by_month_day.is_empty() {
            if frequency != Frequency::Monthly {
                return Err(invalid(format!(
                    "BYMONTHDAY is only valid for monthly rules, not {frequency}"
                )));
            }
            if self.has_ordinal() {
                return Err(invalid(
                    "a monthly rule uses either BYMONTHDAY or an ordinal weekday, not both",
                ));
            }
            if let Some(day) = self.by_month_day.iter().find(|d| !(1..=31).contains(*d)) {
                return Err(invalid(format!("day of month {day} is outside 1-31")));
            }
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> RuleError {
    RuleError::ValidationError(message.into())
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::build::serialize(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::Ordinal;

    #[test]
    fn empty_rule_defaults() {
        let rule = RecurrenceRule::default();
        assert!(rule.is_empty());
        assert_eq!(rule.interval, 1);
        assert!(rule.by_day.is_empty());
        assert!(rule.by_month_day.is_empty());
    }

    const MONTHLY: RecurrenceRule = RecurrenceRule::monthly();

    #[test]
    fn frequency_constructors_are_const() {
        assert_eq!(MONTHLY.frequency, Some(Frequency::Monthly));
        assert_eq!(MONTHLY.interval, 1);
        assert!(MONTHLY.by_day.is_empty());
        assert!(MONTHLY.by_month_day.is_empty());
        assert_eq!(MONTHLY.to_string(), "FREQ=MONTHLY");
    }

    #[test]
    fn validate_accepts_supported_shapes() {
        let rules = [
            RecurrenceRule::daily().with_interval(3),
            RecurrenceRule::weekly().with_by_day(vec![
                RecurrenceWeekday::Monday.into(),
                RecurrenceWeekday::Friday.into(),
            ]),
            RecurrenceRule::monthly().with_by_month_day(vec![31]),
            RecurrenceRule::monthly()
                .with_interval(2)
                .with_by_day(vec![ByDay::nth(Ordinal::Last, RecurrenceWeekday::Friday)]),
            RecurrenceRule::yearly(),
        ];
        for rule in rules {
            assert!(rule.validate().is_ok(), "{rule} should validate");
        }
    }

    #[test]
    fn validate_rejects_ordinals_outside_monthly() {
        let rule = RecurrenceRule::weekly()
            .with_by_day(vec![ByDay::nth(Ordinal::Second, RecurrenceWeekday::Tuesday)]);
        let err = rule.validate().expect_err("ordinal on weekly must fail");
        assert!(err.to_string().contains("2TU"));
    }

    #[test]
    fn validate_rejects_bad_shapes() {
        let rules = [
            RecurrenceRule::empty(),
            RecurrenceRule::daily().with_interval(0),
            RecurrenceRule::monthly().with_by_day(vec![RecurrenceWeekday::Monday.into()]),
            RecurrenceRule::weekly().with_by_month_day(vec![5]),
            RecurrenceRule::monthly().with_by_month_day(vec![32]),
            RecurrenceRule::monthly()
                .with_by_month_day(vec![1])
                .with_by_day(vec![ByDay::nth(Ordinal::First, RecurrenceWeekday::Monday)]),
        ];
        for rule in rules {
            assert!(rule.validate().is_err(), "{rule:?} should be rejected");
        }
    }

    #[test]
    fn weekdays_strip_ordinals() {
        let rule = RecurrenceRule::monthly()
            .with_by_day(vec![ByDay::nth(Ordinal::First, RecurrenceWeekday::Monday)]);
        assert_eq!(rule.weekdays(), vec![RecurrenceWeekday::Monday]);
        assert!(rule.has_ordinal());
    }
}
