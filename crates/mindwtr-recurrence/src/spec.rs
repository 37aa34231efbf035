//! The recurrence value attached to a repeating task.
//!
//! A [`RecurrenceSpec`] keeps its structured fields and the canonical rule
//! string in lockstep: fields are private and every edit rebuilds the string
//! from a validated rule, so the two can never disagree.

use mindwtr_core::types::RecurrenceStrategy;
use mindwtr_rrule::error::RuleError;
use mindwtr_rrule::{ByDay, Frequency, Ordinal, RecurrenceRule, RecurrenceWeekday, serialize};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{RecurrenceError, RecurrenceResult};
use crate::normalize::reconcile;
use crate::stored::{StoredRecurrence, StoredRecurrenceObject};

/// A task's recurrence: either none, or a reconciled spec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Recurrence {
    #[default]
    None,
    Recurring(RecurrenceSpec),
}

impl Recurrence {
    #[must_use]
    pub const fn spec(&self) -> Option<&RecurrenceSpec> {
        match self {
            Self::None => None,
            Self::Recurring(spec) => Some(spec),
        }
    }

    #[must_use]
    pub const fn is_recurring(&self) -> bool {
        matches!(self, Self::Recurring(_))
    }

    /// The stored form, or `None` when the task does not repeat.
    #[must_use]
    pub fn to_stored(&self) -> Option<StoredRecurrence> {
        self.spec().map(RecurrenceSpec::to_stored)
    }
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_stored().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<StoredRecurrence>::deserialize(deserializer)? {
            None => Ok(Self::None),
            Some(stored) => reconcile(&stored).map_err(de::Error::custom),
        }
    }
}

impl From<RecurrenceSpec> for Recurrence {
    fn from(spec: RecurrenceSpec) -> Self {
        Self::Recurring(spec)
    }
}

/// Full recurrence description: base frequency, interval, day selection,
/// strategy, and the cached canonical rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    frequency: Frequency,
    rule: RecurrenceRule,
    strategy: RecurrenceStrategy,
    canonical: String,
}

impl RecurrenceSpec {
    /// Creates a spec with just a base frequency ("every day", "every week", ...).
    #[must_use]
    pub fn new(frequency: Frequency, strategy: RecurrenceStrategy) -> Self {
        let rule = RecurrenceRule::new(frequency);
        Self {
            frequency,
            canonical: serialize(&rule),
            rule,
            strategy,
        }
    }

    /// ## Summary
    /// Creates a spec from a decoded rule.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` if the rule has no frequency or is
    /// not one of the supported shapes (see [`RecurrenceRule::validate`]).
    pub fn from_rule(rule: RecurrenceRule, strategy: RecurrenceStrategy) -> RecurrenceResult<Self> {
        rule.validate()?;
        let frequency = rule
            .frequency
            .ok_or_else(|| RecurrenceError::Validation("rule has no frequency".to_string()))?;
        Ok(Self {
            frequency,
            canonical: serialize(&rule),
            rule,
            strategy,
        })
    }

    /// ## Summary
    /// Creates a spec from a rule string, rejecting anything unreadable.
    ///
    /// Unlike the lenient codec `parse`, this reports why the string was rejected.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Rule` for unparseable strings and
    /// `RecurrenceError::Validation` for unsupported shapes.
    pub fn from_rule_string(rule: &str, strategy: RecurrenceStrategy) -> RecurrenceResult<Self> {
        let parsed = RecurrenceRule::try_parse(rule).map_err(RuleError::from)?;
        Self::from_rule(parsed, strategy)
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    #[must_use]
    pub const fn strategy(&self) -> RecurrenceStrategy {
        self.strategy
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.rule.interval
    }

    #[must_use]
    pub fn by_day(&self) -> &[ByDay] {
        &self.rule.by_day
    }

    #[must_use]
    pub fn by_month_day(&self) -> &[u8] {
        &self.rule.by_month_day
    }

    /// The decoded rule, kept alongside the string so it is never re-parsed.
    #[must_use]
    pub const fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// The canonical rule string.
    #[must_use]
    pub fn rrule(&self) -> &str {
        &self.canonical
    }

    /// Swaps in a new rule after validating it. On error `self` is unchanged.
    fn commit(&mut self, rule: RecurrenceRule) -> RecurrenceResult<()> {
        rule.validate()?;
        let canonical = serialize(&rule);
        tracing::trace!(from = %self.canonical, to = %canonical, "Recurrence rule edited");
        if let Some(frequency) = rule.frequency {
            self.frequency = frequency;
        }
        self.rule = rule;
        self.canonical = canonical;
        Ok(())
    }

    fn require(&self, frequency: Frequency, edit: &str) -> RecurrenceResult<()> {
        if self.frequency == frequency {
            Ok(())
        } else {
            Err(RecurrenceError::Validation(format!(
                "{edit} requires a {} rule, not {}",
                frequency.rule_name(),
                self.frequency.rule_name()
            )))
        }
    }

    /// ## Summary
    /// Changes the base frequency.
    ///
    /// The interval is kept. Day selections the new frequency cannot carry are
    /// dropped: weekday toggles survive only on weekly rules, ordinal weekdays
    /// and days of month only on monthly rules.
    pub fn set_frequency(&mut self, frequency: Frequency) {
        let mut rule = RecurrenceRule::new(frequency).with_interval(self.rule.interval);
        match frequency {
            Frequency::Weekly => {
                rule.by_day = self
                    .rule
                    .by_day
                    .iter()
                    .copied()
                    .filter(|day| !day.is_ordinal())
                    .collect();
            }
            Frequency::Monthly => {
                rule.by_day = self
                    .rule
                    .by_day
                    .iter()
                    .copied()
                    .filter(|day| day.is_ordinal())
                    .collect();
                rule.by_month_day.clone_from(&self.rule.by_month_day);
            }
            Frequency::Daily | Frequency::Yearly => {}
        }

        // Filters above only keep parts valid for the new frequency.
        self.frequency = frequency;
        self.canonical = serialize(&rule);
        self.rule = rule;
    }

    pub fn set_strategy(&mut self, strategy: RecurrenceStrategy) {
        self.strategy = strategy;
    }

    /// ## Summary
    /// Sets the repeat interval ("every N days/weeks/months/years").
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` for an interval of 0.
    pub fn set_interval(&mut self, interval: u32) -> RecurrenceResult<()> {
        let rule = self.rule.clone().with_interval(interval);
        self.commit(rule)
    }

    /// ## Summary
    /// Adds or removes a weekday from a weekly rule.
    ///
    /// Selected weekdays are kept in Sunday-first order.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` unless the rule is weekly.
    pub fn toggle_weekday(&mut self, weekday: RecurrenceWeekday) -> RecurrenceResult<()> {
        self.require(Frequency::Weekly, "toggling a weekday")?;

        let mut days = self.rule.weekdays();
        if let Some(pos) = days.iter().position(|day| *day == weekday) {
            days.remove(pos);
        } else {
            days.push(weekday);
            days.sort_unstable();
        }

        let rule = self
            .rule
            .clone()
            .with_by_day(days.into_iter().map(ByDay::Every).collect());
        self.commit(rule)
    }

    /// ## Summary
    /// Replaces the weekday selection of a weekly rule. Duplicates are dropped,
    /// the given order is otherwise preserved. An empty list means "the
    /// anchor's weekday".
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` unless the rule is weekly.
    pub fn set_weekdays(&mut self, weekdays: &[RecurrenceWeekday]) -> RecurrenceResult<()> {
        self.require(Frequency::Weekly, "selecting weekdays")?;

        let mut by_day: Vec<ByDay> = Vec::with_capacity(weekdays.len());
        for day in weekdays {
            let token = ByDay::Every(*day);
            if !by_day.contains(&token) {
                by_day.push(token);
            }
        }

        let rule = self.rule.clone().with_by_day(by_day);
        self.commit(rule)
    }

    /// ## Summary
    /// Repeats a monthly rule on a fixed day of the month.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` unless the rule is monthly and the
    /// day is within 1-31.
    pub fn set_monthly_day(&mut self, day: u8) -> RecurrenceResult<()> {
        self.require(Frequency::Monthly, "choosing a day of month")?;

        let rule = self
            .rule
            .clone()
            .with_by_day(Vec::new())
            .with_by_month_day(vec![day]);
        self.commit(rule)
    }

    /// ## Summary
    /// Repeats a monthly rule on the Nth (or last) weekday of the month.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` unless the rule is monthly.
    pub fn set_monthly_nth_weekday(
        &mut self,
        ordinal: Ordinal,
        weekday: RecurrenceWeekday,
    ) -> RecurrenceResult<()> {
        self.require(Frequency::Monthly, "choosing an ordinal weekday")?;

        let rule = self
            .rule
            .clone()
            .with_by_month_day(Vec::new())
            .with_by_day(vec![ByDay::nth(ordinal, weekday)]);
        self.commit(rule)
    }

    /// ## Summary
    /// Replaces the BYDAY list as a whole.
    ///
    /// ## Errors
    /// Returns `RecurrenceError::Validation` if the tokens do not fit the
    /// frequency (ordinal tokens outside monthly rules, bare weekdays outside
    /// weekly rules).
    pub fn set_by_day(&mut self, by_day: Vec<ByDay>) -> RecurrenceResult<()> {
        let rule = self.rule.clone().with_by_day(by_day);
        self.commit(rule)
    }

    /// Drops any weekday or day-of-month selection, keeping frequency and interval.
    pub fn clear_pattern(&mut self) {
        let rule = RecurrenceRule::new(self.frequency).with_interval(self.rule.interval);
        self.canonical = serialize(&rule);
        self.rule = rule;
    }

    /// ## Summary
    /// Writes the full object form: rule name, strategy, weekday tokens and
    /// rule string, all derived from the same rule.
    #[must_use]
    pub fn to_stored(&self) -> StoredRecurrence {
        let by_day = (!self.rule.by_day.is_empty())
            .then(|| self.rule.by_day.iter().map(ToString::to_string).collect());

        StoredRecurrence::Object(StoredRecurrenceObject {
            rule: Some(self.frequency.rule_name().to_string()),
            strategy: Some(self.strategy.as_str().to_string()),
            by_day,
            rrule: Some(self.canonical.clone()),
        })
    }
}
