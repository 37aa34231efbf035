//! Next-occurrence computation.
//!
//! Under the `strict` strategy the next occurrence follows the previous
//! anchor, so the schedule stays fixed no matter when the task is completed.
//! Under `fluid` it follows the completion, so the gap between completing a
//! task and its next occurrence stays constant.

mod calendar;

use chrono::{
    DateTime, Datelike, Days, LocalResult, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
};
use mindwtr_core::types::RecurrenceStrategy;
use mindwtr_rrule::{Frequency, RecurrenceRule, RecurrenceWeekday};

use crate::spec::Recurrence;

use calendar::{clamped_date, nth_weekday, shift_month, week_start};

/// ## Summary
/// Applies one unit of `rule` to `base`.
///
/// - daily: `interval` days later
/// - weekly: the next selected weekday after `base` in its week, else the
///   first selected weekday `interval` weeks later (weeks start on Monday);
///   with no weekdays selected, `7 * interval` days later
/// - monthly: the next matching day after `base` in its month, else the first
///   one `interval` months later; with no day selection, the same day of
///   month `interval` months later, clamped to the month's length
/// - yearly: the same month and day `interval` years later (Feb 29 clamps)
///
/// Returns `None` for a rule without a frequency or on calendar overflow.
#[must_use]
pub fn advance(base: NaiveDate, rule: &RecurrenceRule) -> Option<NaiveDate> {
    let frequency = rule.frequency?;
    let interval = rule.interval.max(1);

    let next = match frequency {
        Frequency::Daily => base.checked_add_days(Days::new(u64::from(interval))),
        Frequency::Weekly => advance_weekly(base, &rule.weekdays(), interval),
        Frequency::Monthly if rule.by_day.is_empty() && rule.by_month_day.is_empty() => {
            let (year, month) = shift_month(base.year(), base.month(), interval)?;
            clamped_date(year, month, base.day())
        }
        Frequency::Monthly => advance_monthly(base, rule, interval),
        Frequency::Yearly => {
            let year = base.year().checked_add(i32::try_from(interval).ok()?)?;
            clamped_date(year, base.month(), base.day())
        }
    };

    tracing::trace!(%base, rule = %rule, next = ?next, "Advanced recurrence");
    next
}

fn advance_weekly(
    base: NaiveDate,
    weekdays: &[RecurrenceWeekday],
    interval: u32,
) -> Option<NaiveDate> {
    if weekdays.is_empty() {
        return base.checked_add_days(Days::new(7 * u64::from(interval)));
    }

    let selected = |date: &NaiveDate| {
        weekdays
            .iter()
            .any(|day| RecurrenceWeekday::from_chrono(date.weekday()) == *day)
    };

    let this_week = week_start(base)?;
    if let Some(next) = this_week
        .iter_days()
        .take(7)
        .find(|date| *date > base && selected(date))
    {
        return Some(next);
    }

    this_week
        .checked_add_days(Days::new(7 * u64::from(interval)))?
        .iter_days()
        .take(7)
        .find(selected)
}

fn advance_monthly(base: NaiveDate, rule: &RecurrenceRule, interval: u32) -> Option<NaiveDate> {
    if let Some(next) = month_candidates(base.year(), base.month(), rule)
        .into_iter()
        .find(|date| *date > base)
    {
        return Some(next);
    }

    let (year, month) = shift_month(base.year(), base.month(), interval)?;
    month_candidates(year, month, rule).into_iter().next()
}

/// Every day of the month the rule selects, sorted.
fn month_candidates(year: i32, month: u32, rule: &RecurrenceRule) -> Vec<NaiveDate> {
    let by_month_day = rule
        .by_month_day
        .iter()
        .filter_map(|day| clamped_date(year, month, u32::from(*day)));
    let by_ordinal = rule.by_day.iter().filter_map(|token| {
        let ordinal = token.ordinal()?;
        nth_weekday(year, month, ordinal, token.weekday().to_chrono())
    });

    let mut dates: Vec<NaiveDate> = by_month_day.chain(by_ordinal).collect();
    dates.sort_unstable();
    dates.dedup();
    dates
}

/// ## Summary
/// Computes the next occurrence date for a date-only task.
///
/// The base is `anchor` under `strict` and `completed_on` under `fluid`.
/// Returns `None` when the task does not recur or the calendar overflows.
#[must_use]
pub fn next_occurrence_date(
    anchor: NaiveDate,
    recurrence: &Recurrence,
    completed_on: NaiveDate,
) -> Option<NaiveDate> {
    let spec = recurrence.spec()?;
    let base = match spec.strategy() {
        RecurrenceStrategy::Strict => anchor,
        RecurrenceStrategy::Fluid => completed_on,
    };
    advance(base, spec.rule())
}

/// ## Summary
/// Computes the next occurrence for a timed task.
///
/// The result is in the anchor's time zone and keeps the base's wall-clock
/// time. `completed_at` may be in any zone; it is converted to the anchor's
/// zone before use and is only read under the `fluid` strategy.
///
/// A wall-clock time that does not exist on the target day (DST gap) is moved
/// forward by the length of the gap. An ambiguous one resolves to the earlier
/// instant.
#[must_use]
pub fn next_occurrence<Tz: TimeZone, C: TimeZone>(
    anchor: &DateTime<Tz>,
    recurrence: &Recurrence,
    completed_at: &DateTime<C>,
) -> Option<DateTime<Tz>> {
    let spec = recurrence.spec()?;
    let zone = anchor.timezone();

    let base = match spec.strategy() {
        RecurrenceStrategy::Strict => anchor.naive_local(),
        RecurrenceStrategy::Fluid => completed_at.with_timezone(&zone).naive_local(),
    };

    let date = advance(base.date(), spec.rule())?;
    resolve_local(&zone, date.and_time(base.time()))
}

/// Maps a wall-clock time in `zone` to an instant.
pub(crate) fn resolve_local<Tz: TimeZone>(zone: &Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(resolved) => Some(resolved),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => {
            // In a gap: read the time with the offset in force before the
            // transition, which lands the same distance past it.
            let before = local.checked_sub_signed(TimeDelta::try_days(1)?)?;
            let offset = zone.from_local_datetime(&before).earliest()?.offset().fix();
            let utc = local.checked_sub_signed(TimeDelta::try_seconds(i64::from(
                offset.local_minus_utc(),
            ))?)?;
            tracing::debug!(%local, "Wall-clock time falls in a DST gap, shifting forward");
            Some(zone.from_utc_datetime(&utc))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::RecurrenceSpec;
    use mindwtr_rrule::{ByDay, Ordinal, parse};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn advance_daily_interval() {
        let rule = parse("FREQ=DAILY;INTERVAL=3");
        assert_eq!(advance(date(2024, 2, 27), &rule), Some(date(2024, 3, 1)));
    }

    #[test]
    fn advance_weekly_without_days_keeps_weekday() {
        let rule = parse("FREQ=WEEKLY;INTERVAL=2");
        assert_eq!(advance(date(2024, 1, 3), &rule), Some(date(2024, 1, 17)));
    }

    #[test]
    fn advance_weekly_selected_days() {
        let rule = parse("FREQ=WEEKLY;BYDAY=MO,WE,FR");
        assert_eq!(advance(date(2024, 1, 3), &rule), Some(date(2024, 1, 5)));
        assert_eq!(advance(date(2024, 1, 5), &rule), Some(date(2024, 1, 8)));
        // Sunday closes the Monday-based week.
        assert_eq!(advance(date(2024, 1, 7), &rule), Some(date(2024, 1, 8)));
    }

    #[test]
    fn advance_weekly_interval_skips_weeks() {
        let rule = parse("FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR");
        assert_eq!(advance(date(2024, 1, 1), &rule), Some(date(2024, 1, 5)));
        assert_eq!(advance(date(2024, 1, 5), &rule), Some(date(2024, 1, 15)));
    }

    #[test]
    fn advance_monthly_same_day_clamps() {
        let rule = parse("FREQ=MONTHLY");
        assert_eq!(advance(date(2024, 1, 31), &rule), Some(date(2024, 2, 29)));
        assert_eq!(advance(date(2023, 1, 31), &rule), Some(date(2023, 2, 28)));
        assert_eq!(
            advance(date(2024, 11, 15), &parse("FREQ=MONTHLY;INTERVAL=3")),
            Some(date(2025, 2, 15))
        );
    }

    #[test]
    fn advance_monthly_by_month_day() {
        let rule = parse("FREQ=MONTHLY;BYMONTHDAY=1,15");
        assert_eq!(advance(date(2024, 1, 10), &rule), Some(date(2024, 1, 15)));
        assert_eq!(advance(date(2024, 1, 15), &rule), Some(date(2024, 2, 1)));

        let end = parse("FREQ=MONTHLY;BYMONTHDAY=31");
        assert_eq!(advance(date(2024, 3, 31), &end), Some(date(2024, 4, 30)));
        assert_eq!(advance(date(2024, 1, 31), &end), Some(date(2024, 2, 29)));
    }

    #[test]
    fn advance_monthly_ordinal_weekday() {
        let rule = parse("FREQ=MONTHLY;BYDAY=-1FR");
        assert_eq!(advance(date(2024, 1, 26), &rule), Some(date(2024, 2, 23)));
        assert_eq!(advance(date(2024, 1, 10), &rule), Some(date(2024, 1, 26)));

        let second_tuesday = parse("FREQ=MONTHLY;INTERVAL=2;BYDAY=2TU");
        assert_eq!(advance(date(2024, 1, 9), &second_tuesday), Some(date(2024, 3, 12)));
    }

    #[test]
    fn advance_yearly_leap_day() {
        let rule = parse("FREQ=YEARLY");
        assert_eq!(advance(date(2024, 2, 29), &rule), Some(date(2025, 2, 28)));
        assert_eq!(
            advance(date(2024, 2, 29), &parse("FREQ=YEARLY;INTERVAL=4")),
            Some(date(2028, 2, 29))
        );
    }

    #[test]
    fn advance_empty_rule_is_none() {
        assert_eq!(advance(date(2024, 1, 1), &parse("garbage;;;not-a-rule")), None);
        assert_eq!(advance(NaiveDate::MAX, &parse("FREQ=DAILY")), None);
    }

    #[test]
    fn next_occurrence_date_by_strategy() {
        let mut spec = RecurrenceSpec::new(Frequency::Weekly, RecurrenceStrategy::Strict);
        spec.set_by_day(vec![ByDay::Every(RecurrenceWeekday::Monday)])
            .expect("weekday");
        let strict = Recurrence::from(spec.clone());
        assert_eq!(
            next_occurrence_date(date(2024, 1, 1), &strict, date(2024, 1, 20)),
            Some(date(2024, 1, 8))
        );

        spec.set_strategy(RecurrenceStrategy::Fluid);
        let fluid = Recurrence::from(spec);
        assert_eq!(
            next_occurrence_date(date(2024, 1, 1), &fluid, date(2024, 1, 20)),
            Some(date(2024, 1, 22))
        );

        assert_eq!(
            next_occurrence_date(date(2024, 1, 1), &Recurrence::None, date(2024, 1, 2)),
            None
        );
    }

    #[test]
    fn monthly_candidates_merge_and_sort() {
        let rule = RecurrenceRule::monthly()
            .with_by_day(vec![ByDay::nth(Ordinal::First, RecurrenceWeekday::Monday)]);
        assert_eq!(month_candidates(2024, 4, &rule), vec![date(2024, 4, 1)]);

        let days = RecurrenceRule::monthly().with_by_month_day(vec![30, 31, 5]);
        assert_eq!(
            month_candidates(2024, 2, &days),
            vec![date(2024, 2, 5), date(2024, 2, 29)]
        );
    }
}
