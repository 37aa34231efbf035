//! Calendar arithmetic on plain dates.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use mindwtr_rrule::Ordinal;

/// Number of days in the given month.
pub(crate) fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|last| last.day())
}

/// Moves a (year, month) pair forward by `months`.
pub(crate) fn shift_month(year: i32, month: u32, months: u32) -> Option<(i32, u32)> {
    let index = i64::from(year) * 12 + i64::from(month) - 1 + i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
    Some((year, month))
}

/// The given day of the month, clamped to the month's last day.
pub(crate) fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

/// The Nth (or last) given weekday of a month.
pub(crate) fn nth_weekday(
    year: i32,
    month: u32,
    ordinal: Ordinal,
    weekday: Weekday,
) -> Option<NaiveDate> {
    if ordinal == Ordinal::Last {
        let last = clamped_date(year, month, 31)?;
        let back = (7 + last.weekday().num_days_from_monday() - weekday.num_days_from_monday()) % 7;
        return last.checked_sub_days(Days::new(u64::from(back)));
    }

    let n = u8::try_from(ordinal.value()).ok()?;
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, n)
}

/// Monday of the week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))
}
