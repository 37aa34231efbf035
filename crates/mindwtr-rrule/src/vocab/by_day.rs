use std::fmt;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::RecurrenceWeekday;

/// Position of a weekday within a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ordinal {
    First,
    Second,
    Third,
    Fourth,
    /// The last occurrence in the month (`-1`).
    Last,
}

impl Ordinal {
    /// Returns the signed ordinal as written in a BYDAY token.
    #[must_use]
    pub const fn value(self) -> i8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Last => -1,
        }
    }

    /// Maps a signed ordinal back to the vocabulary. Only 1 to 4 and -1 exist.
    #[must_use]
    pub const fn from_value(value: i8) -> Option<Self> {
        Some(match value {
            1 => Self::First,
            2 => Self::Second,
            3 => Self::Third,
            4 => Self::Fourth,
            -1 => Self::Last,
            _ => return None,
        })
    }
}

impl fmt::Display for Ordinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// "The Nth (or last) given weekday of the month", e.g. `2TU` or `-1FR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrdinalWeekday {
    pub ordinal: Ordinal,
    pub weekday: RecurrenceWeekday,
}

impl OrdinalWeekday {
    #[must_use]
    pub const fn new(ordinal: Ordinal, weekday: RecurrenceWeekday) -> Self {
        Self { ordinal, weekday }
    }
}

impl fmt::Display for OrdinalWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.ordinal, self.weekday)
    }
}

/// A single BYDAY token.
///
/// - `MO` - every Monday (weekly patterns)
/// - `2TU` - second Tuesday of the month (monthly patterns)
/// - `-1FR` - last Friday of the month (monthly patterns)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByDay {
    Every(RecurrenceWeekday),
    Nth(OrdinalWeekday),
}

impl ByDay {
    /// Creates an ordinal token.
    #[must_use]
    pub const fn nth(ordinal: Ordinal, weekday: RecurrenceWeekday) -> Self {
        Self::Nth(OrdinalWeekday::new(ordinal, weekday))
    }

    #[must_use]
    pub const fn weekday(self) -> RecurrenceWeekday {
        match self {
            Self::Every(weekday) => weekday,
            Self::Nth(token) => token.weekday,
        }
    }

    #[must_use]
    pub const fn ordinal(self) -> Option<Ordinal> {
        match self {
            Self::Every(_) => None,
            Self::Nth(token) => Some(token.ordinal),
        }
    }

    #[must_use]
    pub const fn is_ordinal(self) -> bool {
        matches!(self, Self::Nth(_))
    }

    /// Parses a token with an optional ordinal prefix (e.g. `MO`, `1MO`, `-1FR`).
    ///
    /// Returns `None` for unknown weekday codes and for ordinals outside the
    /// supported set (1 to 4, -1).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let split = s.len().checked_sub(2)?;
        if !s.is_char_boundary(split) {
            return None;
        }
        let (ordinal_str, weekday_str) = s.split_at(split);
        let weekday = RecurrenceWeekday::parse(weekday_str)?;

        if ordinal_str.is_empty() {
            return Some(Self::Every(weekday));
        }

        let ordinal = Ordinal::from_value(ordinal_str.parse().ok()?)?;
        Some(Self::nth(ordinal, weekday))
    }
}

impl From<RecurrenceWeekday> for ByDay {
    fn from(weekday: RecurrenceWeekday) -> Self {
        Self::Every(weekday)
    }
}

impl From<OrdinalWeekday> for ByDay {
    fn from(token: OrdinalWeekday) -> Self {
        Self::Nth(token)
    }
}

impl fmt::Display for ByDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Every(weekday) => write!(f, "{weekday}"),
            Self::Nth(token) => write!(f, "{token}"),
        }
    }
}

impl Serialize for ByDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ByDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Self::parse(&token)
            .ok_or_else(|| de::Error::custom(format!("invalid BYDAY token: {token}")))
    }
}
