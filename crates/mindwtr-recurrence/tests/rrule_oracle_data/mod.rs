use chrono::{DateTime, NaiveDateTime, TimeZone};
use mindwtr_recurrence::{Recurrence, RecurrenceSpec, RecurrenceStrategy, next_occurrence};
use rrule::RRuleSet;

/// A rule whose expansion by the `rrule` crate must match repeated
/// application of the scheduler.
pub struct OracleCase {
    pub name: &'static str,
    /// Start as `YYYYMMDDTHHMMSS`, read in `zone`.
    pub dtstart: &'static str,
    pub zone: chrono_tz::Tz,
    /// RRULE body including a `COUNT` that bounds the expansion.
    pub rrule: &'static str,
}

pub fn oracle_cases() -> Vec<OracleCase> {
    vec![
        OracleCase {
            name: "daily_interval",
            dtstart: "20240227T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=DAILY;INTERVAL=3;COUNT=8",
        },
        OracleCase {
            name: "weekly_same_weekday",
            dtstart: "20240103T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=WEEKLY;INTERVAL=2;COUNT=6",
        },
        OracleCase {
            name: "weekly_multiple_days",
            dtstart: "20240103T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=WEEKLY;BYDAY=MO,WE,FR;COUNT=10",
        },
        OracleCase {
            name: "weekly_interval_skips_weeks",
            dtstart: "20240103T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR;COUNT=8",
        },
        OracleCase {
            name: "weekly_interval_sunday_ends_week",
            dtstart: "20240101T073000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=WEEKLY;INTERVAL=2;BYDAY=SU,TU;COUNT=8",
        },
        OracleCase {
            name: "monthly_same_day",
            dtstart: "20240115T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=MONTHLY;COUNT=14",
        },
        OracleCase {
            name: "monthly_last_friday",
            dtstart: "20240126T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=MONTHLY;BYDAY=-1FR;COUNT=12",
        },
        OracleCase {
            name: "monthly_second_tuesday_every_other_month",
            dtstart: "20240109T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=MONTHLY;INTERVAL=2;BYDAY=2TU;COUNT=6",
        },
        OracleCase {
            name: "monthly_fourth_thursday",
            dtstart: "20240101T120000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=MONTHLY;BYDAY=4TH;COUNT=12",
        },
        OracleCase {
            name: "monthly_two_days_of_month",
            dtstart: "20240101T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=MONTHLY;BYMONTHDAY=1,15;COUNT=10",
        },
        OracleCase {
            name: "yearly_interval",
            dtstart: "20240315T090000",
            zone: chrono_tz::UTC,
            rrule: "FREQ=YEARLY;INTERVAL=2;COUNT=5",
        },
        OracleCase {
            name: "weekly_across_dst_start",
            dtstart: "20240301T090000",
            zone: chrono_tz::America::New_York,
            rrule: "FREQ=WEEKLY;BYDAY=TU,FR;COUNT=8",
        },
        OracleCase {
            name: "daily_across_dst_end",
            dtstart: "20241030T083000",
            zone: chrono_tz::Europe::Berlin,
            rrule: "FREQ=DAILY;COUNT=6",
        },
    ]
}

pub fn assert_case(case: &OracleCase) {
    let naive = NaiveDateTime::parse_from_str(case.dtstart, "%Y%m%dT%H%M%S")
        .unwrap_or_else(|err| panic!("Failed to parse dtstart of {}: {err}", case.name));
    let dtstart = case
        .zone
        .from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| panic!("dtstart of {} is not a single instant", case.name));

    let rruleset = if case.zone == chrono_tz::UTC {
        format!("DTSTART:{}Z\nRRULE:{}", case.dtstart, case.rrule)
    } else {
        format!(
            "DTSTART;TZID={}:{}\nRRULE:{}",
            case.zone.name(),
            case.dtstart,
            case.rrule
        )
    };
    let rrule_set: RRuleSet = rruleset
        .parse()
        .unwrap_or_else(|err| panic!("Failed to parse {}: {err}", case.name));
    let expected: Vec<i64> = rrule_set
        .all(100)
        .dates
        .iter()
        .map(DateTime::timestamp)
        .filter(|ts| *ts > dtstart.timestamp())
        .collect();
    assert!(!expected.is_empty(), "Case {} expanded to nothing", case.name);

    let recurrence: Recurrence =
        RecurrenceSpec::from_rule_string(case.rrule, RecurrenceStrategy::Strict)
            .unwrap_or_else(|err| panic!("Failed to build spec for {}: {err}", case.name))
            .into();

    let mut actual = Vec::with_capacity(expected.len());
    let mut anchor = dtstart;
    // Strict scheduling never reads the completion time.
    let completed_at = chrono::Utc::now();
    while actual.len() < expected.len() {
        anchor = next_occurrence(&anchor, &recurrence, &completed_at)
            .unwrap_or_else(|| panic!("Case {} stopped early", case.name));
        actual.push(anchor.timestamp());
    }

    assert_eq!(actual, expected, "Case {} did not match", case.name);
}
