//! Reconciliation of stored recurrences.
//!
//! A stored recurrence can carry the same intent three times over: a base
//! rule name, a weekday list and a rule string. Records written by older
//! versions may have any subset, and the copies may disagree. Everything here
//! collapses them into one [`Recurrence`] whose parts agree by construction.

use chrono::{Datelike, NaiveDate};
use mindwtr_core::types::RecurrenceStrategy;
use mindwtr_rrule::{ByDay, Frequency, RecurrenceRule, build, parse};

use crate::error::RecurrenceResult;
use crate::spec::{Recurrence, RecurrenceSpec};
use crate::stored::{StoredRecurrence, StoredRecurrenceObject};

/// How a monthly recurrence is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthlyPattern {
    /// "Every month on the anchor's day".
    Simple,
    /// Anything else: an interval, an ordinal weekday, or another day.
    Custom,
}

/// ## Summary
/// Returns the weekday tokens of a stored recurrence.
///
/// The structured `byDay` list wins when it has entries; otherwise the tokens
/// come from the rule string. Unreadable tokens in the structured list are
/// skipped.
#[must_use]
pub fn derive_by_day(stored: &StoredRecurrenceObject) -> Vec<ByDay> {
    if let Some(tokens) = stored.by_day.as_ref().filter(|tokens| !tokens.is_empty()) {
        return tokens
            .iter()
            .filter_map(|token| {
                let day = ByDay::parse(token);
                if day.is_none() {
                    tracing::debug!(token, "Skipping unreadable weekday token");
                }
                day
            })
            .collect();
    }

    stored
        .rrule
        .as_deref()
        .map(|rrule| parse(rrule).by_day)
        .unwrap_or_default()
}

/// ## Summary
/// Returns the rule string for a stored recurrence.
///
/// The stored string is used as-is when present. Otherwise one is built from
/// the base rule name and [`derive_by_day`]. `None` when neither exists.
#[must_use]
pub fn derive_canonical_string(stored: &StoredRecurrenceObject) -> Option<String> {
    if let Some(rrule) = stored.rrule.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return Some(rrule.to_string());
    }

    let frequency = stored.rule.as_deref().and_then(Frequency::parse)?;
    Some(build(frequency, &derive_by_day(stored), 1))
}

/// ## Summary
/// Classifies a monthly recurrence for display.
///
/// `Simple` when the rule repeats every month on the anchor's own day of
/// month; `Custom` otherwise. `None` for non-monthly rules.
#[must_use]
pub fn classify_monthly_pattern(
    spec: &RecurrenceSpec,
    anchor: NaiveDate,
) -> Option<MonthlyPattern> {
    if spec.frequency() != Frequency::Monthly {
        return None;
    }

    let anchor_day = u8::try_from(anchor.day()).ok();
    let same_day = match spec.by_month_day() {
        [] => true,
        [day] => Some(*day) == anchor_day,
        _ => false,
    };

    if spec.interval() == 1 && !spec.rule().has_ordinal() && same_day {
        Some(MonthlyPattern::Simple)
    } else {
        Some(MonthlyPattern::Custom)
    }
}

/// ## Summary
/// Reconciles a stored recurrence into a single consistent value.
///
/// A rule string that parses with a frequency is authoritative. The base rule
/// name and weekday list are only consulted when the string is missing or
/// unreadable. An unknown strategy falls back to the default.
///
/// ## Errors
/// Returns `RecurrenceError::Validation` when the recurrence is readable but
/// combines parts that do not fit together (e.g. ordinal weekdays on a weekly
/// rule).
pub fn reconcile(stored: &StoredRecurrence) -> RecurrenceResult<Recurrence> {
    let object = stored.to_object();
    let strategy = parse_strategy(object.strategy.as_deref());

    let Some(rule) = authoritative_rule(&object) else {
        if object.rule.is_some() || object.rrule.is_some() || object.by_day.is_some() {
            tracing::warn!(
                rule = ?object.rule,
                rrule = ?object.rrule,
                "Stored recurrence has no usable rule, treating task as not recurring"
            );
        }
        return Ok(Recurrence::None);
    };

    let spec = RecurrenceSpec::from_rule(rule, strategy)?;
    tracing::trace!(rrule = spec.rrule(), strategy = %spec.strategy(), "Reconciled recurrence");
    Ok(Recurrence::Recurring(spec))
}

fn authoritative_rule(object: &StoredRecurrenceObject) -> Option<RecurrenceRule> {
    if let Some(rrule) = object.rrule.as_deref() {
        let parsed = parse(rrule);
        if !parsed.is_empty() {
            if structured_fields_diverge(object, &parsed) {
                tracing::debug!(
                    rule = ?object.rule,
                    by_day = ?object.by_day,
                    rrule,
                    "Structured recurrence fields disagree with rrule, keeping rrule"
                );
            }
            return Some(parsed);
        }
    }

    let frequency = object.rule.as_deref().and_then(Frequency::parse)?;
    Some(RecurrenceRule::new(frequency).with_by_day(derive_by_day(object)))
}

/// Whether the stored rule name or weekday list says something other than the
/// parsed rule string.
fn structured_fields_diverge(object: &StoredRecurrenceObject, parsed: &RecurrenceRule) -> bool {
    let frequency_differs = object
        .rule
        .as_deref()
        .and_then(Frequency::parse)
        .is_some_and(|frequency| parsed.frequency != Some(frequency));

    let by_day_differs = object
        .by_day
        .as_ref()
        .is_some_and(|tokens| !tokens.is_empty() && derive_by_day(object) != parsed.by_day);

    frequency_differs || by_day_differs
}

fn parse_strategy(value: Option<&str>) -> RecurrenceStrategy {
    let Some(value) = value else {
        return RecurrenceStrategy::default();
    };
    RecurrenceStrategy::parse(value).unwrap_or_else(|err| {
        tracing::debug!(error = %err, value, "Unknown recurrence strategy, using default");
        RecurrenceStrategy::default()
    })
}
