use std::str::FromStr;

use super::{ParseError, ParseErrorKind, ParseResult};
use crate::vocab::{ByDay, Frequency, RecurrenceRule};

/// Clause keys this codec understands. Anything else is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleKey {
    Freq,
    Interval,
    ByDay,
    ByMonthDay,
}

impl RuleKey {
    fn parse(key: &str) -> Option<Self> {
        Some(match key.to_ascii_uppercase().as_str() {
            "FREQ" => Self::Freq,
            "INTERVAL" => Self::Interval,
            "BYDAY" => Self::ByDay,
            "BYMONTHDAY" => Self::ByMonthDay,
            _ => return None,
        })
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Freq => "FREQ",
            Self::Interval => "INTERVAL",
            Self::ByDay => "BYDAY",
            Self::ByMonthDay => "BYMONTHDAY",
        }
    }
}

impl RecurrenceRule {
    /// ## Summary
    /// Parses a rule string strictly.
    ///
    /// Keys are case-insensitive and may appear in any order. Empty clauses and
    /// an optional `RRULE:` prefix are tolerated; keys outside the supported
    /// subset (`COUNT`, `UNTIL`, `WKST`, ...) are ignored.
    ///
    /// ## Errors
    /// Returns a [`ParseError`] if the input is empty, a clause has no `=`, a key
    /// repeats, `FREQ` is missing or unsupported, or a value is malformed.
    pub fn try_parse(input: &str) -> ParseResult<Self> {
        let body = strip_rrule_prefix(input.trim());
        if body.is_empty() {
            return Err(ParseError::new(
                ParseErrorKind::Empty,
                None,
                "rule string is empty",
            ));
        }

        let mut rule = Self::empty();
        let mut seen: Vec<RuleKey> = Vec::with_capacity(4);

        for (index, part) in body.split(';').enumerate() {
            let clause = index + 1;
            let part = part.trim();
            if part.is_empty() {
                continue;
            }

            let (key, value) = part.split_once('=').ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::MalformedClause,
                    Some(clause),
                    format!("expected KEY=VALUE, found {part:?}"),
                )
            })?;

            let Some(key) = RuleKey::parse(key.trim()) else {
                tracing::trace!(key = key.trim(), "Ignoring unsupported rule part");
                continue;
            };

            if seen.contains(&key) {
                return Err(ParseError::new(
                    ParseErrorKind::DuplicateKey,
                    Some(clause),
                    format!("{} appears more than once", key.as_str()),
                ));
            }
            seen.push(key);

            parse_rule_part(&mut rule, key, value.trim(), clause)?;
        }

        if rule.frequency.is_none() {
            return Err(ParseError::new(
                ParseErrorKind::MissingFrequency,
                None,
                "rule has no FREQ clause",
            ));
        }

        Ok(rule)
    }
}

impl FromStr for RecurrenceRule {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        Self::try_parse(s)
    }
}

/// ## Summary
/// Parses a rule string, degrading anything unreadable to the empty rule.
///
/// Never fails. Rule strings may come from older app versions or be damaged
/// in sync, and losing a recurrence is preferable to refusing the task.
#[must_use]
pub fn parse(input: &str) -> RecurrenceRule {
    RecurrenceRule::try_parse(input).unwrap_or_else(|err| {
        tracing::debug!(error = %err, input, "Unreadable rule string, treating as no recurrence");
        RecurrenceRule::empty()
    })
}

fn strip_rrule_prefix(s: &str) -> &str {
    match s.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => s[6..].trim_start(),
        _ => s,
    }
}

/// Parses a single key-value pair.
fn parse_rule_part(
    rule: &mut RecurrenceRule,
    key: RuleKey,
    value: &str,
    clause: usize,
) -> ParseResult<()> {
    match key {
        RuleKey::Freq => {
            rule.frequency = Some(Frequency::parse(value).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::UnsupportedFrequency,
                    Some(clause),
                    format!("{value:?} is not DAILY, WEEKLY, MONTHLY or YEARLY"),
                )
            })?);
        }
        RuleKey::Interval => {
            rule.interval = value
                .parse::<u32>()
                .ok()
                .filter(|interval| *interval >= 1)
                .ok_or_else(|| ParseError::invalid_value(clause, key.as_str(), value))?;
        }
        RuleKey::ByDay => rule.by_day = parse_byday(value, clause)?,
        RuleKey::ByMonthDay => rule.by_month_day = parse_month_days(value, clause)?,
    }
    Ok(())
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(s: &str, clause: usize) -> ParseResult<Vec<ByDay>> {
    s.split(',')
        .map(|token| {
            ByDay::parse(token).ok_or_else(|| {
                ParseError::new(
                    ParseErrorKind::InvalidWeekday,
                    Some(clause),
                    format!("unsupported BYDAY token {:?}", token.trim()),
                )
            })
        })
        .collect()
}

/// Parses a comma-separated list of days of the month (1-31).
fn parse_month_days(s: &str, clause: usize) -> ParseResult<Vec<u8>> {
    s.split(',')
        .map(|v| {
            v.trim()
                .parse::<u8>()
                .ok()
                .filter(|day| (1..=31).contains(day))
                .ok_or_else(|| ParseError::invalid_value(clause, "BYMONTHDAY", v))
        })
        .collect()
}
