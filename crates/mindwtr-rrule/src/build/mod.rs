//! Canonical rule string serialization.
//!
//! Clauses are always emitted in the order `FREQ`, `INTERVAL`, `BYDAY`,
//! `BYMONTHDAY` so identical rules produce byte-identical strings.

use crate::vocab::{ByDay, Frequency, RecurrenceRule};

/// ## Summary
/// Builds the canonical rule string for a frequency, BYDAY list and interval.
///
/// `INTERVAL` is emitted only when greater than 1 and `BYDAY` only when the
/// list is non-empty. Token order is preserved.
#[must_use]
pub fn build(frequency: Frequency, by_day: &[ByDay], interval: u32) -> String {
    serialize(
        &RecurrenceRule::new(frequency)
            .with_interval(interval)
            .with_by_day(by_day.to_vec()),
    )
}

/// ## Summary
/// Serializes a rule to its canonical string.
///
/// The empty rule serializes to an empty string.
#[must_use]
pub fn serialize(rule: &RecurrenceRule) -> String {
    let mut parts = Vec::with_capacity(4);

    if let Some(freq) = rule.frequency {
        parts.push(format!("FREQ={freq}"));
    }

    if rule.interval > 1 {
        parts.push(format!("INTERVAL={}", rule.interval));
    }

    if !rule.by_day.is_empty() {
        let s: Vec<_> = rule.by_day.iter().map(ToString::to_string).collect();
        parts.push(format!("BYDAY={}", s.join(",")));
    }

    if !rule.by_month_day.is_empty() {
        let s: Vec<_> = rule.by_month_day.iter().map(ToString::to_string).collect();
        parts.push(format!("BYMONTHDAY={}", s.join(",")));
    }

    parts.join(";")
}
