use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// How the next occurrence of a repeating task is anchored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceStrategy {
    /// Follow the original schedule, ignoring when the task was completed.
    #[default]
    Strict,
    /// Offset from the moment the task was actually completed.
    Fluid,
}

impl RecurrenceStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Fluid => "fluid",
        }
    }

    /// ## Summary
    /// Parses a strategy name (case-insensitive).
    ///
    /// ## Errors
    /// Returns `CoreError::InvalidInput` for anything other than `strict` or `fluid`.
    pub fn parse(s: &str) -> CoreResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "fluid" => Ok(Self::Fluid),
            other => Err(CoreError::InvalidInput(format!(
                "unknown recurrence strategy: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for RecurrenceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecurrenceStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}
